//! Trust anchor commands.
//!
//! `vessel anchor` - Show the attestation trust anchor in use.

use super::load_config;
use anyhow::Context;
use std::path::PathBuf;
use vessel_token::TrustAnchor;

/// Affine coordinates of an uncompressed SEC1 hex point.
fn coordinates(sec1_hex: &str) -> Option<(&str, &str)> {
    let body = sec1_hex.strip_prefix("04")?;
    if body.len() != 128 {
        return None;
    }
    Some(body.split_at(64))
}

/// Print the trust anchor resolved from configuration (or the default).
pub fn show_anchor(config: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config.as_deref())?;
    let anchor =
        TrustAnchor::from_config(&config.trust_anchor).context("Failed to load trust anchor")?;
    let sec1 = anchor.to_sec1_hex();

    println!("Attestation trust anchor (P-256):");
    if let Some((x, y)) = coordinates(&sec1) {
        println!("  X: {x}");
        println!("  Y: {y}");
    }
    println!();
    println!("SEC1 (uncompressed):");
    println!("{sec1}");

    Ok(())
}
