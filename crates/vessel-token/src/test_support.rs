//! Token builders for unit tests.

use crate::codec;
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};

/// Fields of a session token to sign; `None` coordinates come from the key.
pub struct TokenTemplate {
    pub header: String,
    pub scope: String,
    pub issued_at: i64,
    pub expires_at: i64,
    pub user_x: Option<String>,
    pub user_y: Option<String>,
}

impl TokenTemplate {
    pub fn new(scope: &str, issued_at: i64, expires_at: i64) -> Self {
        Self {
            header: r#"{"typ":"JWT","alg":"ES256"}"#.to_string(),
            scope: scope.to_string(),
            issued_at,
            expires_at,
            user_x: None,
            user_y: None,
        }
    }
}

/// The identity a session signed by `key` will carry.
pub fn user_id(key: &SigningKey) -> String {
    let point = key.verifying_key().to_encoded_point(false);
    codec::encode(point.x().unwrap())
}

/// Sign `<header>.<payload>` with ES256 and append the raw `r || s` signature.
pub fn sign_compact(key: &SigningKey, header: &str, payload: &str) -> String {
    let signed = format!("{}.{}", codec::encode(header), codec::encode(payload));
    let signature: Signature = key.sign(signed.as_bytes());
    format!("{signed}.{}", codec::encode(signature.to_bytes()))
}

pub fn sign_session_token(key: &SigningKey, template: &TokenTemplate) -> String {
    let point = key.verifying_key().to_encoded_point(false);
    let user_x = template
        .user_x
        .clone()
        .unwrap_or_else(|| codec::encode(point.x().unwrap()));
    let user_y = template
        .user_y
        .clone()
        .unwrap_or_else(|| codec::encode(point.y().unwrap()));

    let payload = serde_json::json!({
        "sub": user_x,
        "ecy": user_y,
        "aud": template.scope,
        "iat": template.issued_at,
        "exp": template.expires_at,
    });
    sign_compact(key, &template.header, &payload.to_string())
}

/// An attestation token signed by `anchor_key`.
pub fn sign_attestation(anchor_key: &SigningKey, claims: serde_json::Value) -> String {
    sign_compact(anchor_key, r#"{"typ":"JWT","alg":"ES256"}"#, &claims.to_string())
}
