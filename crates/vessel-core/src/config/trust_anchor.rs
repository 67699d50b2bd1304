//! Trust anchor configuration.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// X coordinate of the attestation authority's P-256 public key.
pub const DEFAULT_ANCHOR_X: &str =
    "2890e20192d5da85f3281df77a64b88d39c216b0964c7d6feb67cf76e99e6de1";

/// Y coordinate of the attestation authority's P-256 public key.
pub const DEFAULT_ANCHOR_Y: &str =
    "12b05260ed58b932938d9665ea58e0531b45318b987ab5d7dd3461adc3ca8d65";

/// Where to find the public key that signs attestation tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustAnchorConfig {
    /// Hex-encoded X coordinate.
    #[serde(default = "default_anchor_x")]
    pub x: String,

    /// Hex-encoded Y coordinate.
    #[serde(default = "default_anchor_y")]
    pub y: String,

    /// Environment variable overriding the X coordinate.
    #[serde(default)]
    pub x_env: Option<String>,

    /// Environment variable overriding the Y coordinate.
    #[serde(default)]
    pub y_env: Option<String>,

    /// Key file holding either `<x-hex>` and `<y-hex>` on two lines, or a
    /// single uncompressed SEC1 point (`04 || x || y`) in hex.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Hex coordinates after env/file/inline resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorCoordinates {
    pub x: String,
    pub y: String,
}

impl Default for TrustAnchorConfig {
    fn default() -> Self {
        Self {
            x: default_anchor_x(),
            y: default_anchor_y(),
            x_env: None,
            y_env: None,
            file: None,
        }
    }
}

impl TrustAnchorConfig {
    /// Resolve the coordinates. Environment variables win over the key file,
    /// which wins over the inline values.
    pub fn resolve_coordinates(&self) -> Result<AnchorCoordinates, ConfigError> {
        let mut coords = match &self.file {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                parse_key_file(&raw)?
            }
            None => AnchorCoordinates {
                x: self.x.trim().to_string(),
                y: self.y.trim().to_string(),
            },
        };

        if let Some(value) = self.x_env.as_deref().and_then(read_env) {
            coords.x = value;
        }
        if let Some(value) = self.y_env.as_deref().and_then(read_env) {
            coords.y = value;
        }

        Ok(coords)
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_key_file(raw: &str) -> Result<AnchorCoordinates, ConfigError> {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect();

    match lines.as_slice() {
        [x, y] => Ok(AnchorCoordinates {
            x: x.to_string(),
            y: y.to_string(),
        }),
        // Uncompressed SEC1: "04" prefix followed by two 64-char coordinates.
        [point] if point.len() == 130 && point.starts_with("04") && point.is_ascii() => {
            Ok(AnchorCoordinates {
                x: point[2..66].to_string(),
                y: point[66..].to_string(),
            })
        }
        _ => Err(ConfigError::Config(
            "trust anchor file must hold two hex coordinates or one uncompressed SEC1 point"
                .to_string(),
        )),
    }
}

fn default_anchor_x() -> String {
    DEFAULT_ANCHOR_X.to_string()
}

fn default_anchor_y() -> String {
    DEFAULT_ANCHOR_Y.to_string()
}
