//! CLI command implementations for Vessel.

pub mod config;
pub mod keys;
pub mod token;

use anyhow::Context;
use std::fs;
use std::path::Path;
use vessel_core::VesselConfig;

/// Load `vessel.yaml` if given, otherwise the built-in defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<VesselConfig> {
    match path {
        Some(path) => {
            let config = VesselConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            tracing::debug!(
                path = %path.display(),
                scopes = config.permitted_scopes.len(),
                "loaded configuration"
            );
            Ok(config)
        }
        None => {
            tracing::debug!("no configuration file given, using defaults");
            Ok(VesselConfig::default())
        }
    }
}

/// Token text given inline, or read from a file if the argument names one.
pub fn read_token_arg(arg: &str) -> anyhow::Result<String> {
    let path = Path::new(arg);
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read token from {}", path.display()))?;
        return Ok(content.trim().to_string());
    }
    Ok(arg.trim().to_string())
}
