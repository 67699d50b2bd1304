//! Configuration types for Vessel.
//!
//! A single `vessel.yaml` describes the attestation trust anchor, the server
//! names (scopes) a session token may be issued for, and the names under
//! which the transport carries the session and attestation tokens.
//!
//! ```yaml
//! permitted_scopes: ["api.example.com"]
//! trust_anchor:
//!   x_env: VESSEL_ANCHOR_X
//!   y_env: VESSEL_ANCHOR_Y
//! token_names:
//!   session: web3auth
//! clock_skew_seconds: 5
//! ```

pub mod trust_anchor;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub use trust_anchor::{AnchorCoordinates, TrustAnchorConfig};

/// Complete Vessel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselConfig {
    /// Public key that signs attestation tokens.
    #[serde(default)]
    pub trust_anchor: TrustAnchorConfig,

    /// Server names accepted as a session token's audience, in match order.
    #[serde(default)]
    pub permitted_scopes: Vec<String>,

    /// Transport names of the session and attestation tokens.
    #[serde(default)]
    pub token_names: TokenNames,

    /// Symmetric tolerance applied to both edges of a token's validity window.
    #[serde(default = "default_clock_skew")]
    pub clock_skew_seconds: u64,
}

impl Default for VesselConfig {
    fn default() -> Self {
        Self {
            trust_anchor: TrustAnchorConfig::default(),
            permitted_scopes: Vec::new(),
            token_names: TokenNames::default(),
            clock_skew_seconds: default_clock_skew(),
        }
    }
}

/// Names under which the transport (typically cookies) carries each token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenNames {
    #[serde(default = "default_session_name")]
    pub session: String,

    #[serde(default = "default_name_name")]
    pub name: String,

    #[serde(default = "default_email_name")]
    pub email: String,

    #[serde(default = "default_sms_name")]
    pub sms: String,
}

impl Default for TokenNames {
    fn default() -> Self {
        Self {
            session: default_session_name(),
            name: default_name_name(),
            email: default_email_name(),
            sms: default_sms_name(),
        }
    }
}

fn default_session_name() -> String {
    "web3auth".to_string()
}

fn default_name_name() -> String {
    "web3_name".to_string()
}

fn default_email_name() -> String {
    "web3_email".to_string()
}

fn default_sms_name() -> String {
    "web3_sms".to_string()
}

/// Upper bound on `clock_skew_seconds`.
pub const MAX_CLOCK_SKEW_SECS: u64 = 3600;

fn default_clock_skew() -> u64 {
    5
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl VesselConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no request could ever be verified against.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for scope in &self.permitted_scopes {
            if scope.trim().is_empty() {
                return Err(ConfigError::Config(
                    "permitted_scopes must not contain empty entries".to_string(),
                ));
            }
            if !seen.insert(scope.as_str()) {
                return Err(ConfigError::Config(format!(
                    "permitted scope '{scope}' is listed more than once"
                )));
            }
        }

        let names = [
            &self.token_names.session,
            &self.token_names.name,
            &self.token_names.email,
            &self.token_names.sms,
        ];
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err(ConfigError::Config(
                "token_names entries must not be empty".to_string(),
            ));
        }

        if self.clock_skew_seconds > MAX_CLOCK_SKEW_SECS {
            return Err(ConfigError::Config(format!(
                "clock_skew_seconds must be at most {MAX_CLOCK_SKEW_SECS}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let cfg = VesselConfig::from_yaml("{}").unwrap();
        assert!(cfg.permitted_scopes.is_empty());
        assert_eq!(cfg.clock_skew_seconds, 5);
        assert_eq!(cfg.token_names.session, "web3auth");
        assert_eq!(cfg.token_names.name, "web3_name");
        assert_eq!(cfg.token_names.email, "web3_email");
        assert_eq!(cfg.token_names.sms, "web3_sms");
        assert_eq!(cfg.trust_anchor.x, trust_anchor::DEFAULT_ANCHOR_X);
    }

    #[test]
    fn test_default_matches_empty_yaml() {
        let cfg = VesselConfig::default();
        assert_eq!(cfg.clock_skew_seconds, 5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
permitted_scopes:
  - api.example.com
  - staging.example.com
token_names:
  session: session_cookie
clock_skew_seconds: 2
"#;
        let cfg = VesselConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            cfg.permitted_scopes,
            vec!["api.example.com", "staging.example.com"]
        );
        assert_eq!(cfg.token_names.session, "session_cookie");
        assert_eq!(cfg.token_names.email, "web3_email");
        assert_eq!(cfg.clock_skew_seconds, 2);
    }

    #[test]
    fn test_duplicate_scope_rejected() {
        let yaml = "permitted_scopes: [a.example.com, a.example.com]";
        assert!(matches!(
            VesselConfig::from_yaml(yaml),
            Err(ConfigError::Config(_))
        ));
    }

    #[test]
    fn test_blank_scope_rejected() {
        let yaml = "permitted_scopes: ['  ']";
        assert!(matches!(
            VesselConfig::from_yaml(yaml),
            Err(ConfigError::Config(_))
        ));
    }

    #[test]
    fn test_excessive_clock_skew_rejected() {
        assert!(matches!(
            VesselConfig::from_yaml("clock_skew_seconds: 86400"),
            Err(ConfigError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            VesselConfig::from_yaml("permitted_scopes: {"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
