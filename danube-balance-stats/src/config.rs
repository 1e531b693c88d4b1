use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::Path;
use tracing::info;

use crate::constraint::BalancingConstraint;
use crate::model::ClusterModel;

/// Reads a YAML or JSON document; `.json` files are parsed as JSON, everything else as YAML
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON document {}", path.display()))
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML document {}", path.display()))
    }
}

/// Loads a cluster snapshot document
pub fn load_cluster_model(path: &Path) -> Result<ClusterModel> {
    let model: ClusterModel = load_document(path)?;
    info!(snapshot = %path.display(), "cluster model loaded");
    Ok(model)
}

/// Loads and validates the balancing thresholds, falling back to the defaults without a file
pub fn load_constraint(path: Option<&Path>) -> Result<BalancingConstraint> {
    let constraint = match path {
        Some(path) => {
            let constraint: BalancingConstraint = load_document(path)?;
            info!(constraints = %path.display(), "balancing constraint loaded");
            constraint
        }
        None => BalancingConstraint::default(),
    };
    constraint.validate()?;
    Ok(constraint)
}
