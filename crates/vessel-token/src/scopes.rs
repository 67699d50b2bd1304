//! Permitted scopes and scope resolution.
//!
//! A session token names exactly one audience. A server may answer to
//! several names, so the resolver tries the token against each registered
//! name in order and keeps the first success.

use crate::error::TokenError;
use crate::session::Session;
use crate::token::SessionVerifier;
use chrono::{DateTime, Utc};
use std::sync::{Arc, PoisonError, RwLock};

/// Ordered, duplicate-free allow-list of server names.
///
/// Registration may run concurrently with verification; readers always
/// work on a snapshot taken under the read lock.
#[derive(Debug, Default)]
pub struct PermittedScopes {
    scopes: RwLock<Vec<String>>,
}

impl PermittedScopes {
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let permitted = Self::default();
        for scope in scopes {
            permitted.register(scope);
        }
        permitted
    }

    /// Permit a server name. Returns `false` if it was already permitted.
    pub fn register(&self, scope: impl Into<String>) -> bool {
        let scope = scope.into();
        let mut scopes = self.scopes.write().unwrap_or_else(PoisonError::into_inner);
        if scopes.contains(&scope) {
            return false;
        }
        tracing::info!(scope = %scope, "registered permitted scope");
        scopes.push(scope);
        true
    }

    /// Withdraw a server name. Returns `false` if it was not permitted.
    pub fn revoke(&self, scope: &str) -> bool {
        let mut scopes = self.scopes.write().unwrap_or_else(PoisonError::into_inner);
        let before = scopes.len();
        scopes.retain(|s| s != scope);
        let removed = scopes.len() != before;
        if removed {
            tracing::info!(scope, "revoked permitted scope");
        }
        removed
    }

    /// Consistent copy of the current list, in registration order.
    pub fn snapshot(&self) -> Vec<String> {
        self.scopes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.scopes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|s| s == scope)
    }

    pub fn len(&self) -> usize {
        self.scopes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Matches a session token against every permitted scope.
#[derive(Debug, Clone)]
pub struct ScopeResolver {
    verifier: SessionVerifier,
    scopes: Arc<PermittedScopes>,
}

impl ScopeResolver {
    pub fn new(scopes: Arc<PermittedScopes>) -> Self {
        Self::with_verifier(SessionVerifier::new(), scopes)
    }

    pub fn with_verifier(verifier: SessionVerifier, scopes: Arc<PermittedScopes>) -> Self {
        Self { verifier, scopes }
    }

    /// The shared allow-list; register or revoke names through it.
    pub fn scopes(&self) -> &Arc<PermittedScopes> {
        &self.scopes
    }

    pub fn verifier(&self) -> &SessionVerifier {
        &self.verifier
    }

    pub fn resolve(&self, token: &str) -> Result<Session, TokenError> {
        self.resolve_at(token, Utc::now())
    }

    /// Verify `token` against each permitted scope at `now`.
    ///
    /// On failure the error is `NoMatchingScope` whose source is the last
    /// attempt's error.
    pub fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> Result<Session, TokenError> {
        let scopes = self.scopes.snapshot();
        if scopes.is_empty() {
            tracing::warn!("no permitted scopes configured; every session token will be rejected");
            return Err(TokenError::NoPermittedScopes);
        }

        let mut last = None;
        for scope in &scopes {
            match self.verifier.verify_at(scope, token, now) {
                Ok(session) => {
                    tracing::debug!(user = %session.user_id, scope = %scope, "session token verified");
                    return Ok(session);
                }
                Err(err) => {
                    tracing::debug!(scope = %scope, error = %err, "session token rejected for scope");
                    last = Some(err);
                }
            }
        }

        Err(TokenError::NoMatchingScope {
            attempts: scopes.len(),
            last: Box::new(last.unwrap_or(TokenError::NoPermittedScopes)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TokenTemplate, sign_session_token, user_id};
    use p256::ecdsa::SigningKey;
    use rand_core::OsRng;
    use std::error::Error;

    const NOW: i64 = 1_700_000_000;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(NOW, 0).unwrap()
    }

    fn resolver(scopes: &[&str]) -> ScopeResolver {
        ScopeResolver::new(Arc::new(PermittedScopes::new(scopes.iter().copied())))
    }

    #[test]
    fn test_register_is_idempotent_and_ordered() {
        let scopes = PermittedScopes::default();
        assert!(scopes.register("b"));
        assert!(scopes.register("a"));
        assert!(!scopes.register("b"));
        assert_eq!(scopes.snapshot(), vec!["b", "a"]);
        assert!(scopes.contains("a"));
        assert_eq!(scopes.len(), 2);
    }

    #[test]
    fn test_revoke() {
        let scopes = PermittedScopes::new(["a", "b"]);
        assert!(scopes.revoke("a"));
        assert!(!scopes.revoke("a"));
        assert_eq!(scopes.snapshot(), vec!["b"]);
    }

    #[test]
    fn test_empty_list_always_fails() {
        let key = SigningKey::random(&mut OsRng);
        let token = sign_session_token(&key, &TokenTemplate::new("A", NOW - 1, NOW + 60));

        assert!(matches!(
            resolver(&[]).resolve_at(&token, now()),
            Err(TokenError::NoPermittedScopes)
        ));
        assert!(matches!(
            resolver(&[]).resolve_at("garbage", now()),
            Err(TokenError::NoPermittedScopes)
        ));
    }

    #[test]
    fn test_matches_later_scope() {
        let key = SigningKey::random(&mut OsRng);
        let token = sign_session_token(&key, &TokenTemplate::new("A", NOW - 1, NOW + 60));

        let session = resolver(&["B", "A"]).resolve_at(&token, now()).unwrap();
        assert_eq!(session.scope, "A");
        assert_eq!(session.user_id, user_id(&key));
    }

    #[test]
    fn test_no_match_reports_last_attempt() {
        let key = SigningKey::random(&mut OsRng);
        let token = sign_session_token(&key, &TokenTemplate::new("A", NOW - 1, NOW + 60));

        match resolver(&["B", "C"]).resolve_at(&token, now()) {
            Err(err @ TokenError::NoMatchingScope { attempts: 2, .. }) => {
                match err.root_cause() {
                    TokenError::ScopeMismatch { required, .. } => assert_eq!(required, "C"),
                    other => panic!("unexpected root cause: {other:?}"),
                }
                assert!(err.source().is_some());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_expired_token_on_matching_scope() {
        let key = SigningKey::random(&mut OsRng);
        let token = sign_session_token(&key, &TokenTemplate::new("A", NOW - 600, NOW - 300));

        let err = resolver(&["A"]).resolve_at(&token, now()).unwrap_err();
        assert!(matches!(err.root_cause(), TokenError::TokenExpired { .. }));
    }

    #[test]
    fn test_registration_visible_to_resolver() {
        let key = SigningKey::random(&mut OsRng);
        let token = sign_session_token(&key, &TokenTemplate::new("A", NOW - 1, NOW + 60));
        let resolver = resolver(&["B"]);

        assert!(resolver.resolve_at(&token, now()).is_err());
        resolver.scopes().register("A");
        assert!(resolver.resolve_at(&token, now()).is_ok());
    }

    #[test]
    fn test_concurrent_registration() {
        let scopes = Arc::new(PermittedScopes::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let scopes = Arc::clone(&scopes);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        scopes.register(format!("s{}", (i * 50 + j) % 100));
                        let _ = scopes.snapshot();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(scopes.len(), 100);
    }
}
