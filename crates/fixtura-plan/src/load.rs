use std::path::Path;

use serde_json::Value;

use crate::errors::{PlanError, Result};

/// Reads a plan document as JSON, converting TOML documents on the way.
pub fn load_plan_value(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match extension.as_str() {
        "json" => Ok(serde_json::from_str(&contents)?),
        "toml" => Ok(toml::from_str(&contents)?),
        other => Err(PlanError::UnsupportedFormat(other.to_string())),
    }
}
