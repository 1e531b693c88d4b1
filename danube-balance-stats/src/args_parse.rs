use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Counts line followed by one line per statistic kind
    Table,
    /// Compact metadata + statistics map
    Json,
    /// Every computed field, pretty printed
    Full,
}

#[derive(Debug, Parser)]
#[command(name = "danube-balance-stats")]
#[command(about = "Compute balance statistics of a Danube cluster snapshot", long_about = None)]
pub(crate) struct Args {
    /// Cluster snapshot document (YAML, or JSON with a .json extension)
    #[arg(long)]
    pub(crate) snapshot: PathBuf,

    /// Balancing constraint document; defaults apply when omitted
    #[arg(long)]
    pub(crate) constraints: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) output: OutputFormat,
}
