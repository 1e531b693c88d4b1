mod args_parse;

use crate::args_parse::{Args, OutputFormat};

use anyhow::{Context, Result};
use clap::Parser;
use danube_balance_stats::config::{load_cluster_model, load_constraint};
use danube_balance_stats::ClusterBalanceStats;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize logging, stdout is reserved for the statistics
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let model = load_cluster_model(&args.snapshot)?;
    let constraint = load_constraint(args.constraints.as_deref())?;

    let stats = ClusterBalanceStats::populate(&model, &constraint)
        .context("Failed to compute cluster balance statistics")?;

    info!(
        output = ?args.output,
        monitored_partitions_pct = stats.monitored_partitions_percentage(),
        snapshot_windows = stats.num_snapshot_windows(),
        "rendering cluster balance statistics"
    );

    match args.output {
        OutputFormat::Table => {
            println!("{}", stats.to_string_counts());
            println!("{}", stats);
        }
        OutputFormat::Json => println!("{}", stats.to_json_string()),
        OutputFormat::Full => println!("{}", serde_json::to_string_pretty(&stats)?),
    }

    Ok(())
}
