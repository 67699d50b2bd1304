//! `vessel check-config` - Validate a configuration file.

use super::load_config;
use anyhow::Context;
use std::path::PathBuf;
use vessel_token::{AttestationKind, TrustAnchor};

/// Load, validate and resolve everything a verifier would need at startup.
pub fn check(file: PathBuf) -> anyhow::Result<()> {
    let config = load_config(Some(&file))?;
    TrustAnchor::from_config(&config.trust_anchor).context("Failed to load trust anchor")?;

    println!("✔ Configuration is valid: {}", file.display());
    println!();
    if config.permitted_scopes.is_empty() {
        println!("  ⚠ No permitted scopes: every session token will be rejected.");
    } else {
        println!("  Permitted scopes:");
        for scope in &config.permitted_scopes {
            println!("    - {scope}");
        }
    }
    println!("  Clock skew: {}s", config.clock_skew_seconds);
    println!("  Session token: {}", config.token_names.session);
    for kind in AttestationKind::ALL {
        println!(
            "  {} attestation: {}",
            kind,
            kind.lookup_name(&config.token_names)
        );
    }

    Ok(())
}
