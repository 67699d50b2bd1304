//! Shared helpers for the integration tests.

#![allow(dead_code)]

use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use serde_json::{Value, json};
use vessel_token::codec;

pub const ES256_HEADER: &str = r#"{"typ":"JWT","alg":"ES256"}"#;

/// A session holder with a freshly generated key.
pub struct Holder {
    pub key: SigningKey,
}

impl Holder {
    pub fn generate() -> Self {
        Self {
            key: SigningKey::random(&mut rand_core::OsRng),
        }
    }

    /// The identity sessions signed by this holder carry.
    pub fn user_id(&self) -> String {
        let point = self.key.verifying_key().to_encoded_point(false);
        codec::encode(point.x().unwrap())
    }

    pub fn user_y(&self) -> String {
        let point = self.key.verifying_key().to_encoded_point(false);
        codec::encode(point.y().unwrap())
    }

    pub fn session_token(&self, scope: &str, issued_at: i64, expires_at: i64) -> String {
        let payload = json!({
            "sub": self.user_id(),
            "ecy": self.user_y(),
            "aud": scope,
            "iat": issued_at,
            "exp": expires_at,
        });
        sign_compact(&self.key, ES256_HEADER, &payload)
    }
}

/// Sign `<header>.<payload>` and append the raw `r || s` signature.
pub fn sign_compact(key: &SigningKey, header: &str, payload: &Value) -> String {
    let signed = format!(
        "{}.{}",
        codec::encode(header),
        codec::encode(payload.to_string())
    );
    let signature: Signature = key.sign(signed.as_bytes());
    format!("{signed}.{}", codec::encode(signature.to_bytes()))
}

/// An attestation issued by `authority` for `subject`.
pub fn attestation(authority: &SigningKey, subject: &str, kind: &str, data: &str) -> String {
    let claims = json!({
        "sub": subject,
        "ats_type": kind,
        "ats_data": data,
        "iss": "vessel-attestation-authority",
        "iat": chrono::Utc::now().timestamp() - 60,
        "exp": chrono::Utc::now().timestamp() + 3600,
    });
    sign_compact(authority, ES256_HEADER, &claims)
}
