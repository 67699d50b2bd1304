//! # vessel-token
//!
//! Verification of web3 session tokens and the attestations layered on top
//! of them.
//!
//! ## Two Trust Models
//!
//! | Token | Signed By | Proves | Format |
//! |-------|-----------|--------|--------|
//! | **Session token** | The session holder, with the key embedded in its own payload | Possession of that key, freshness, audience | `<header>.<payload>.<r‖s>` |
//! | **Attestation token** | The fixed attestation authority (trust anchor) | A verified name, email or phone number for an identity | ES256 JWT |
//!
//! A session token alone says nothing about *who* holds the key; it is a
//! self-certifying identity. Attestations bind real-world attributes to
//! that identity and are strictly optional: a bad or missing attestation
//! never invalidates the session.
//!
//! ## Flow
//!
//! 1. [`SessionAssembler::authenticate`] reads the session token from a
//!    [`TokenSource`] (usually cookies).
//! 2. [`ScopeResolver`] tries the token against every [`PermittedScopes`]
//!    entry using [`SessionVerifier`].
//! 3. On success [`AttestationVerifier`] checks the name, email and sms
//!    attestations against the [`TrustAnchor`] and merges the survivors
//!    into [`Session::attributes`].

pub mod attestation;
pub mod claims;
pub mod codec;
pub mod error;
pub mod keys;
pub mod scopes;
pub mod session;
pub mod token;

#[cfg(test)]
mod test_support;

pub use attestation::AttestationVerifier;
pub use claims::{AttestationClaims, SessionTokenHeader, SessionTokenPayload};
pub use error::{AttestationError, KeyError, TokenError};
pub use keys::TrustAnchor;
pub use scopes::{PermittedScopes, ScopeResolver};
pub use session::{AttestationKind, Session, SessionAssembler, TokenSource};
pub use token::{
    ParsedSessionToken, RawSignature, SessionVerifier, TokenInfo, inspect_token_unverified,
};
