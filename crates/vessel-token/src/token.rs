//! Session token parsing and verification.
//!
//! A session token is `<header>.<payload>.<signature>`, each segment URL-safe
//! base64 without required padding. The payload carries the signer's own
//! P-256 public key, so a valid signature proves possession of the matching
//! private key and nothing more: who owns that key is established separately
//! by attestations.

use crate::claims::{SessionTokenHeader, SessionTokenPayload};
use crate::codec;
use crate::error::TokenError;
use crate::keys;
use crate::session::Session;
use chrono::{DateTime, Duration, Utc};
use p256::FieldBytes;
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use p256::ecdsa::{Signature, VerifyingKey};
use sha2::{Digest, Sha256};

/// Tolerance applied to both edges of the validity window, in seconds.
pub const DEFAULT_CLOCK_SKEW_SECS: i64 = 5;

/// Length of a raw `r || s` signature.
pub const SIGNATURE_LEN: usize = 64;

/// A raw ECDSA signature: two 32-byte big-endian scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl TryFrom<&[u8]> for RawSignature {
    type Error = TokenError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(TokenError::MalformedSignature { len: bytes.len() });
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Ok(Self { r, s })
    }
}

impl RawSignature {
    fn to_ecdsa(self) -> Result<Signature, p256::ecdsa::Error> {
        Signature::from_scalars(
            FieldBytes::clone_from_slice(&self.r),
            FieldBytes::clone_from_slice(&self.s),
        )
    }
}

/// A structurally valid session token whose signature is not yet checked.
#[derive(Debug, Clone)]
pub struct ParsedSessionToken<'a> {
    /// Still-encoded header segment, as signed.
    pub header_segment: &'a str,
    /// Still-encoded payload segment, as signed.
    pub payload_segment: &'a str,
    pub header: SessionTokenHeader,
    pub payload: SessionTokenPayload,
    pub signature: RawSignature,
    /// The key the token claims to be signed with.
    pub public_key: VerifyingKey,
}

impl<'a> ParsedSessionToken<'a> {
    /// Parse a session token.
    ///
    /// Checks the segment layout, the declared type and algorithm, the
    /// signature length, and that the embedded coordinates form a P-256
    /// point. Does not check the signature itself.
    pub fn parse(token: &'a str) -> Result<Self, TokenError> {
        let [header_segment, payload_segment, signature_segment] = split_segments(token)?;

        let header: SessionTokenHeader = serde_json::from_slice(&codec::decode(header_segment)?)
            .map_err(|e| TokenError::MalformedHeader(e.to_string()))?;

        if !header.is_supported() {
            return Err(TokenError::UnsupportedAlgorithm {
                typ: header.token_type,
                alg: header.algorithm,
            });
        }

        let payload: SessionTokenPayload =
            serde_json::from_slice(&codec::decode(payload_segment)?)
                .map_err(|e| TokenError::MalformedPayload(e.to_string()))?;

        // Length is checked before the bytes are split into r and s.
        let signature = RawSignature::try_from(codec::decode(signature_segment)?.as_slice())?;

        let public_key = embedded_public_key(&payload)?;

        Ok(Self {
            header_segment,
            payload_segment,
            header,
            payload,
            signature,
            public_key,
        })
    }

    /// SHA-256 over `"<header-segment>.<payload-segment>"`.
    pub fn signed_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.header_segment.as_bytes());
        hasher.update(b".");
        hasher.update(self.payload_segment.as_bytes());
        hasher.finalize().into()
    }

    /// Check the signature against the embedded public key.
    pub fn verify_signature(&self) -> Result<(), TokenError> {
        let invalid = || TokenError::InvalidSignature {
            user: self.payload.user_x.clone(),
        };
        let signature = self.signature.to_ecdsa().map_err(|_| invalid())?;
        self.public_key
            .verify_prehash(&self.signed_digest(), &signature)
            .map_err(|_| invalid())
    }
}

fn split_segments(token: &str) -> Result<[&str; 3], TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    match segments.as_slice() {
        [h, p, s] if !h.is_empty() && !p.is_empty() && !s.is_empty() => Ok([*h, *p, *s]),
        _ => Err(TokenError::MalformedToken {
            segments: segments.iter().filter(|s| !s.is_empty()).count(),
        }),
    }
}

fn embedded_public_key(payload: &SessionTokenPayload) -> Result<VerifyingKey, TokenError> {
    let x = codec::decode(&payload.user_x)?;
    let y = codec::decode(&payload.user_y)?;

    // A key that cannot exist cannot have produced the signature.
    let invalid = || TokenError::InvalidSignature {
        user: payload.user_x.clone(),
    };
    let x = keys::field_bytes(&x).ok_or_else(invalid)?;
    let y = keys::field_bytes(&y).ok_or_else(invalid)?;
    keys::verifying_key(&x, &y).map_err(|_| invalid())
}

/// Verifies self-signed session tokens against a single required scope.
#[derive(Debug, Clone, Copy)]
pub struct SessionVerifier {
    clock_skew: Duration,
}

impl Default for SessionVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionVerifier {
    /// Verifier with the standard 5 second clock skew tolerance.
    pub fn new() -> Self {
        Self {
            clock_skew: Duration::seconds(DEFAULT_CLOCK_SKEW_SECS),
        }
    }

    /// Verifier with a custom clock skew tolerance.
    pub fn with_clock_skew(clock_skew: Duration) -> Self {
        Self { clock_skew }
    }

    pub fn clock_skew(&self) -> Duration {
        self.clock_skew
    }

    /// Verify a token for `required_scope` at the current time.
    pub fn verify(&self, required_scope: &str, token: &str) -> Result<Session, TokenError> {
        self.verify_at(required_scope, token, Utc::now())
    }

    /// Verify a token for `required_scope` at `now`.
    ///
    /// Order of checks: structure, signature, scope, validity window. The
    /// returned session's window is the skew-widened one.
    pub fn verify_at(
        &self,
        required_scope: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, TokenError> {
        let parsed = ParsedSessionToken::parse(token)?;
        parsed.verify_signature()?;

        let payload = parsed.payload;
        if payload.scope != required_scope {
            return Err(TokenError::ScopeMismatch {
                required: required_scope.to_string(),
                actual: payload.scope,
            });
        }

        let created_at = timestamp(payload.issued_at, "iat")?
            .checked_sub_signed(self.clock_skew)
            .ok_or_else(|| TokenError::MalformedPayload("iat out of range".to_string()))?;
        let expires_at = timestamp(payload.expires_at, "exp")?
            .checked_add_signed(self.clock_skew)
            .ok_or_else(|| TokenError::MalformedPayload("exp out of range".to_string()))?;

        if now < created_at {
            return Err(TokenError::TokenNotYetValid {
                not_before: created_at,
            });
        }
        if now > expires_at {
            return Err(TokenError::TokenExpired {
                expired_at: expires_at,
            });
        }

        Ok(Session::new(
            payload.user_x,
            payload.scope,
            created_at,
            expires_at,
        ))
    }
}

fn timestamp(secs: i64, claim: &str) -> Result<DateTime<Utc>, TokenError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| TokenError::MalformedPayload(format!("{claim} out of range")))
}

/// Decode a session token's header and payload without checking anything
/// beyond structure (for debugging).
pub fn inspect_token_unverified(token: &str) -> Result<TokenInfo, TokenError> {
    let [header_segment, payload_segment, signature_segment] = split_segments(token)?;

    let header = serde_json::from_slice(&codec::decode(header_segment)?)
        .map_err(|e| TokenError::MalformedHeader(e.to_string()))?;
    let payload = serde_json::from_slice(&codec::decode(payload_segment)?)
        .map_err(|e| TokenError::MalformedPayload(e.to_string()))?;
    let signature_len = codec::decode(signature_segment)?.len();

    Ok(TokenInfo {
        header,
        payload,
        signature_len,
    })
}

/// Information about a token (for inspection).
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub header: SessionTokenHeader,
    pub payload: SessionTokenPayload,
    /// Decoded signature length in bytes.
    pub signature_len: usize,
}
