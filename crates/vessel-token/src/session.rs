//! Verified sessions and their assembly from transport tokens.

use crate::attestation::AttestationVerifier;
use crate::error::{KeyError, TokenError};
use crate::keys::TrustAnchor;
use crate::scopes::{PermittedScopes, ScopeResolver};
use crate::token::SessionVerifier;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::sync::Arc;
use vessel_core::{TokenNames, VesselConfig};

/// Attribute kinds an attestation can vouch for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttestationKind {
    Name,
    Email,
    Sms,
}

impl AttestationKind {
    pub const ALL: [AttestationKind; 3] = [Self::Name, Self::Email, Self::Sms];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Sms => "sms",
        }
    }

    /// Transport name the attestation token for this kind is carried under.
    pub fn lookup_name<'a>(&self, names: &'a TokenNames) -> &'a str {
        match self {
            Self::Name => &names.name,
            Self::Email => &names.email,
            Self::Sms => &names.sms,
        }
    }
}

impl fmt::Display for AttestationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated session.
///
/// Only produced once signature, scope and validity window all pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// URL-safe base64 X coordinate of the session key; the stable identity.
    pub user_id: String,
    pub scope: String,
    /// Skew-adjusted start of the validity window.
    pub created_at: DateTime<Utc>,
    /// Skew-adjusted end of the validity window.
    pub expires_at: DateTime<Utc>,
    /// Attested attributes; any subset may be missing.
    pub attributes: BTreeMap<AttestationKind, String>,
}

impl Session {
    pub(crate) fn new(
        user_id: String,
        scope: String,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            scope,
            created_at,
            expires_at,
            attributes: BTreeMap::new(),
        }
    }

    pub fn attribute(&self, kind: AttestationKind) -> Option<&str> {
        self.attributes.get(&kind).map(String::as_str)
    }

    /// Get time until expiration.
    pub fn time_until_expiration(&self) -> Duration {
        self.expires_at - Utc::now()
    }
}

/// Where token text comes from, keyed by transport name (e.g. cookie name).
pub trait TokenSource {
    fn token(&self, name: &str) -> Option<String>;
}

impl<S: BuildHasher> TokenSource for HashMap<String, String, S> {
    fn token(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl TokenSource for BTreeMap<String, String> {
    fn token(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Resolves a session token and layers attestations on top.
#[derive(Debug, Clone)]
pub struct SessionAssembler {
    resolver: ScopeResolver,
    attestations: AttestationVerifier,
    names: TokenNames,
}

impl SessionAssembler {
    pub fn new(resolver: ScopeResolver, attestations: AttestationVerifier) -> Self {
        Self {
            resolver,
            attestations,
            names: TokenNames::default(),
        }
    }

    pub fn with_token_names(mut self, names: TokenNames) -> Self {
        self.names = names;
        self
    }

    /// Build from configuration: load the trust anchor, seed the permitted
    /// scopes and apply the clock skew and token names.
    pub fn from_config(config: &VesselConfig) -> Result<Self, KeyError> {
        config.validate()?;
        let anchor = TrustAnchor::from_config(&config.trust_anchor)?;

        let skew = Duration::seconds(config.clock_skew_seconds as i64);
        let scopes = Arc::new(PermittedScopes::new(config.permitted_scopes.iter().cloned()));
        let resolver = ScopeResolver::with_verifier(SessionVerifier::with_clock_skew(skew), scopes);
        let attestations = AttestationVerifier::new(anchor).with_leeway(config.clock_skew_seconds);

        Ok(Self::new(resolver, attestations).with_token_names(config.token_names.clone()))
    }

    pub fn resolver(&self) -> &ScopeResolver {
        &self.resolver
    }

    /// Shortcut to the shared allow-list.
    pub fn scopes(&self) -> &Arc<PermittedScopes> {
        self.resolver.scopes()
    }

    pub fn token_names(&self) -> &TokenNames {
        &self.names
    }

    pub fn assemble<S>(&self, raw_token: &str, lookups: &S) -> Result<Session, TokenError>
    where
        S: TokenSource + ?Sized,
    {
        self.assemble_at(raw_token, lookups, Utc::now())
    }

    /// Resolve `raw_token`, then add every attestation `lookups` holds for
    /// the session's owner. Attestation lookups only happen on success.
    pub fn assemble_at<S>(
        &self,
        raw_token: &str,
        lookups: &S,
        now: DateTime<Utc>,
    ) -> Result<Session, TokenError>
    where
        S: TokenSource + ?Sized,
    {
        let mut session = self.resolver.resolve_at(raw_token, now)?;

        for kind in AttestationKind::ALL {
            let token = lookups.token(kind.lookup_name(&self.names));
            if let Some(value) = self
                .attestations
                .verify_attestation(&session.user_id, token.as_deref())
            {
                session.attributes.insert(kind, value);
            }
        }

        Ok(session)
    }

    pub fn authenticate<S>(&self, source: &S) -> Result<Session, TokenError>
    where
        S: TokenSource + ?Sized,
    {
        self.authenticate_at(source, Utc::now())
    }

    /// Look up the session token under its transport name and assemble.
    pub fn authenticate_at<S>(&self, source: &S, now: DateTime<Utc>) -> Result<Session, TokenError>
    where
        S: TokenSource + ?Sized,
    {
        let raw_token = source
            .token(&self.names.session)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| TokenError::MissingToken {
                name: self.names.session.clone(),
            })?;
        self.assemble_at(&raw_token, source, now)
    }
}
