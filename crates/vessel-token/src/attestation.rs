//! Attestation tokens: authority-signed claims about a session's owner.
//!
//! Unlike session tokens these are standard ES256 JWTs signed by one fixed
//! trust anchor. They only ever add attributes to a session, so every
//! failure collapses to "absent".

use crate::claims::AttestationClaims;
use crate::error::AttestationError;
use crate::keys::TrustAnchor;
use crate::token::DEFAULT_CLOCK_SKEW_SECS;
use chrono::Utc;
use jsonwebtoken::{Algorithm, Validation};

/// Verifies attestation tokens against the trust anchor.
#[derive(Debug, Clone)]
pub struct AttestationVerifier {
    anchor: TrustAnchor,
    leeway_secs: u64,
}

impl AttestationVerifier {
    pub fn new(anchor: TrustAnchor) -> Self {
        Self {
            anchor,
            leeway_secs: DEFAULT_CLOCK_SKEW_SECS.unsigned_abs(),
        }
    }

    /// Tolerance for `exp`, `nbf` and `iat`.
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    pub fn anchor(&self) -> &TrustAnchor {
        &self.anchor
    }

    /// The attested value if `token` is present, signed by the anchor and
    /// issued to `owner`; `None` otherwise.
    pub fn verify_attestation(&self, owner: &str, token: Option<&str>) -> Option<String> {
        let token = token.filter(|t| !t.is_empty())?;
        match self.check(owner, token) {
            Ok(claims) => Some(claims.attestation_data),
            Err(err) => {
                tracing::debug!(owner, error = %err, "attestation ignored");
                None
            }
        }
    }

    /// Full verification with the rejection reason, for diagnostics.
    pub fn check(&self, owner: &str, token: &str) -> Result<AttestationClaims, AttestationError> {
        let mut validation = Validation::new(Algorithm::ES256);
        validation.leeway = self.leeway_secs;
        validation.validate_aud = false;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["sub"]);

        let claims =
            jsonwebtoken::decode::<AttestationClaims>(token, self.anchor.decoding_key(), &validation)?
                .claims;

        if claims.sub != owner {
            return Err(AttestationError::SubjectMismatch {
                subject: claims.sub,
                owner: owner.to_string(),
            });
        }

        if let Some(issued_at) = claims.iat {
            let latest = Utc::now().timestamp().saturating_add_unsigned(self.leeway_secs);
            if issued_at > latest {
                return Err(AttestationError::IssuedInFuture { issued_at });
            }
        }

        if claims.attestation_data.is_empty() {
            return Err(AttestationError::EmptyData);
        }

        Ok(claims)
    }
}
