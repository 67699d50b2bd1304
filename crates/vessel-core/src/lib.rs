//! # vessel-core
//!
//! Configuration shared by the Vessel crates: where the attestation trust
//! anchor comes from, which server names a session token may be scoped to,
//! and under which names the transport carries each token.

// Configuration types shared across all Vessel crates
pub mod config;

pub use config::{AnchorCoordinates, ConfigError, TokenNames, TrustAnchorConfig, VesselConfig};
