//! Error types for the token crate.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Reasons a session token is rejected.
///
/// Every variant is terminal: verification is a pure computation over its
/// inputs, so retrying the same token can never change the outcome.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Text outside the URL-safe base64 alphabet (after padding restoration).
    #[error("malformed base64url encoding: {0}")]
    MalformedEncoding(#[from] base64::DecodeError),

    /// The token is not three non-empty dot-separated segments.
    #[error("malformed token: expected 3 non-empty segments, found {segments}")]
    MalformedToken { segments: usize },

    /// The header segment is not a valid header document.
    #[error("malformed token header: {0}")]
    MalformedHeader(String),

    /// The header names a token type or algorithm other than JWT/ES256.
    #[error("unsupported token type '{typ}' with algorithm '{alg}'")]
    UnsupportedAlgorithm { typ: String, alg: String },

    /// The payload segment is not a valid payload document.
    #[error("malformed token payload: {0}")]
    MalformedPayload(String),

    /// The signature segment does not decode to exactly 64 bytes.
    #[error("malformed signature: expected 64 bytes, got {len}")]
    MalformedSignature { len: usize },

    /// The signature does not verify against the embedded public key.
    #[error("invalid signature for user '{user}'")]
    InvalidSignature { user: String },

    /// The token was issued for a different server.
    #[error("scope mismatch: required '{required}', token has '{actual}'")]
    ScopeMismatch { required: String, actual: String },

    /// The current time is before the skew-adjusted issue time.
    #[error("token not valid before {not_before}")]
    TokenNotYetValid { not_before: DateTime<Utc> },

    /// The current time is after the skew-adjusted expiry time.
    #[error("token has expired at {expired_at}")]
    TokenExpired { expired_at: DateTime<Utc> },

    /// No server names are registered, so no token can ever match.
    #[error("no permitted scopes are configured; register at least one server name")]
    NoPermittedScopes,

    /// Every permitted scope was tried and none accepted the token.
    #[error("token did not verify against any of {attempts} permitted scopes")]
    NoMatchingScope {
        attempts: usize,
        #[source]
        last: Box<TokenError>,
    },

    /// The transport carried no session token under the expected name.
    #[error("no session token present under '{name}'")]
    MissingToken { name: String },
}

impl TokenError {
    /// The most specific cause: unwraps `NoMatchingScope` to its last attempt.
    pub fn root_cause(&self) -> &TokenError {
        match self {
            TokenError::NoMatchingScope { last, .. } => last.root_cause(),
            other => other,
        }
    }
}

/// Reasons an attestation token is dropped.
///
/// These never escape the attestation verifier's public entry point; they
/// exist for diagnostics and logging.
#[derive(Debug, Error)]
pub enum AttestationError {
    /// Structure, algorithm, signature or standard time claims rejected.
    #[error("attestation token rejected: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Issued to a different identity.
    #[error("attestation subject '{subject}' does not match session owner '{owner}'")]
    SubjectMismatch { subject: String, owner: String },

    /// The `iat` claim lies in the future.
    #[error("attestation issued in the future (iat {issued_at})")]
    IssuedInFuture { issued_at: i64 },

    /// Verified, but carries no attestation value.
    #[error("attestation carries no data")]
    EmptyData,
}

/// Errors loading the attestation trust anchor.
#[derive(Debug, Error)]
pub enum KeyError {
    /// A coordinate is not valid hex.
    #[error("invalid hex in trust anchor {coordinate} coordinate: {source}")]
    InvalidHex {
        coordinate: &'static str,
        #[source]
        source: hex::FromHexError,
    },

    /// A coordinate does not fit in a P-256 field element.
    #[error("trust anchor {coordinate} coordinate is {len} bytes, expected at most 32")]
    InvalidCoordinate { coordinate: &'static str, len: usize },

    /// The coordinates do not describe a point on P-256.
    #[error("trust anchor is not a valid P-256 public key: {0}")]
    InvalidPoint(String),

    /// The configuration is invalid or could not be read.
    #[error("invalid configuration: {0}")]
    Config(#[from] vessel_core::ConfigError),
}
