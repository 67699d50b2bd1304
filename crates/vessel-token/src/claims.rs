//! Wire documents carried inside session and attestation tokens.

use serde::{Deserialize, Serialize};

/// The only token type a session token may declare.
pub const SESSION_TOKEN_TYPE: &str = "JWT";

/// The only algorithm a session token may declare.
pub const SESSION_TOKEN_ALGORITHM: &str = "ES256";

/// Session token header: `{"typ":"JWT","alg":"ES256"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokenHeader {
    #[serde(rename = "typ")]
    pub token_type: String,

    #[serde(rename = "alg")]
    pub algorithm: String,
}

impl SessionTokenHeader {
    /// Exact, case-sensitive match against JWT/ES256.
    pub fn is_supported(&self) -> bool {
        self.token_type == SESSION_TOKEN_TYPE && self.algorithm == SESSION_TOKEN_ALGORITHM
    }
}

impl Default for SessionTokenHeader {
    fn default() -> Self {
        Self {
            token_type: SESSION_TOKEN_TYPE.to_string(),
            algorithm: SESSION_TOKEN_ALGORITHM.to_string(),
        }
    }
}

/// Self-signed identity claim.
///
/// The signer's public key travels in the payload: `sub` is the
/// URL-safe base64 X coordinate (and doubles as the user's identity),
/// `ecy` the Y coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokenPayload {
    #[serde(rename = "sub")]
    pub user_x: String,

    #[serde(rename = "ecy")]
    pub user_y: String,

    #[serde(rename = "aud")]
    pub scope: String,

    /// Issue time, epoch seconds.
    #[serde(rename = "iat")]
    pub issued_at: i64,

    /// Expiry time, epoch seconds.
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

/// Claims of an authority-signed attestation token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationClaims {
    /// Identity the attestation was issued to.
    pub sub: String,

    /// Attestation kind as named by the authority (e.g. "email").
    #[serde(rename = "ats_type", default)]
    pub attestation_type: String,

    /// The verified value itself; opaque to this crate.
    #[serde(rename = "ats_data", default)]
    pub attestation_data: String,

    #[serde(default)]
    pub iss: Option<String>,

    #[serde(default)]
    pub iat: Option<i64>,

    #[serde(default)]
    pub exp: Option<i64>,

    #[serde(default)]
    pub nbf: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_wire_names() {
        let header: SessionTokenHeader =
            serde_json::from_str(r#"{"typ":"JWT","alg":"ES256"}"#).unwrap();
        assert!(header.is_supported());
        assert_eq!(header, SessionTokenHeader::default());
    }

    #[test]
    fn test_header_is_case_sensitive() {
        let header: SessionTokenHeader =
            serde_json::from_str(r#"{"typ":"jwt","alg":"es256"}"#).unwrap();
        assert!(!header.is_supported());

        let header: SessionTokenHeader =
            serde_json::from_str(r#"{"typ":"JWT","alg":"HS256"}"#).unwrap();
        assert!(!header.is_supported());
    }

    #[test]
    fn test_payload_wire_names() {
        let payload: SessionTokenPayload = serde_json::from_str(
            r#"{"sub":"xx","ecy":"yy","aud":"api.example.com","iat":10,"exp":20}"#,
        )
        .unwrap();
        assert_eq!(payload.user_x, "xx");
        assert_eq!(payload.user_y, "yy");
        assert_eq!(payload.scope, "api.example.com");
        assert_eq!(payload.issued_at, 10);
        assert_eq!(payload.expires_at, 20);
    }

    #[test]
    fn test_payload_missing_field_rejected() {
        let res: Result<SessionTokenPayload, _> =
            serde_json::from_str(r#"{"sub":"xx","aud":"a","iat":1,"exp":2}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_attestation_claims_optional_fields() {
        let claims: AttestationClaims =
            serde_json::from_str(r#"{"sub":"owner","ats_type":"email","ats_data":"a@b.c"}"#)
                .unwrap();
        assert_eq!(claims.attestation_type, "email");
        assert_eq!(claims.attestation_data, "a@b.c");
        assert!(claims.exp.is_none());
    }
}
