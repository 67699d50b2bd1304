//! Session token commands.
//!
//! `vessel verify` - Verify a session token and its attestations.
//! `vessel inspect` - Decode a session token without verification.

use super::{load_config, read_token_arg};
use anyhow::Context;
use chrono::{DateTime, Duration};
use std::collections::BTreeMap;
use std::path::PathBuf;
use vessel_token::{AttestationKind, Session, SessionAssembler, inspect_token_unverified};

/// Arguments of `vessel verify`.
#[derive(Debug, Default)]
pub struct VerifyArgs {
    pub token: String,
    pub scopes: Vec<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub sms: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
}

impl VerifyArgs {
    fn attestation(&self, kind: AttestationKind) -> Option<&String> {
        match kind {
            AttestationKind::Name => self.name.as_ref(),
            AttestationKind::Email => self.email.as_ref(),
            AttestationKind::Sms => self.sms.as_ref(),
        }
    }
}

/// Build the assembler and token lookups the arguments describe, then
/// authenticate.
fn authenticate(args: &VerifyArgs) -> anyhow::Result<Session> {
    let mut config = load_config(args.config.as_deref())?;
    if !args.scopes.is_empty() {
        config.permitted_scopes = args.scopes.clone();
    }

    let assembler =
        SessionAssembler::from_config(&config).context("Failed to load trust anchor")?;

    let names = assembler.token_names();
    let mut lookups = BTreeMap::new();
    lookups.insert(names.session.clone(), read_token_arg(&args.token)?);
    for kind in AttestationKind::ALL {
        if let Some(arg) = args.attestation(kind) {
            lookups.insert(kind.lookup_name(names).to_string(), read_token_arg(arg)?);
        }
    }

    assembler
        .authenticate(&lookups)
        .context("Token verification failed")
}

/// Verify a session token.
pub fn verify(args: VerifyArgs) -> anyhow::Result<()> {
    let session = authenticate(&args)?;
    tracing::debug!(
        user = %session.user_id,
        scope = %session.scope,
        attributes = session.attributes.len(),
        "session verified"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    println!("✔ Session is valid");
    println!();
    println!("Session Details:");
    println!("  User:    {}", session.user_id);
    println!("  Scope:   {}", session.scope);
    println!("  Valid:   {} to {}", session.created_at, session.expires_at);
    println!(
        "  Expires: {}",
        describe_remaining(session.time_until_expiration())
    );
    for kind in AttestationKind::ALL {
        let status = match (session.attribute(kind), args.attestation(kind)) {
            (Some(value), _) => value.to_string(),
            (None, Some(_)) => "(rejected)".to_string(),
            (None, None) => "(not presented)".to_string(),
        };
        println!("  {:<8} {}", format!("{kind}:"), status);
    }

    Ok(())
}

/// Inspect a token without verification.
pub fn inspect(token: String) -> anyhow::Result<()> {
    let token_str = read_token_arg(&token)?;
    let info = inspect_token_unverified(&token_str)?;

    println!("Token Information (signature NOT verified):");
    println!("  Type:      {}", info.header.token_type);
    println!("  Algorithm: {}", info.header.algorithm);
    println!("  Subject:   {}", info.payload.user_x);
    println!("  Scope:     {}", info.payload.scope);
    println!("  Issued:    {}", describe_timestamp(info.payload.issued_at));
    println!("  Expires:   {}", describe_timestamp(info.payload.expires_at));
    println!("  Signature: {} bytes", info.signature_len);
    println!();
    println!("{}", serde_json::to_string_pretty(&info.payload)?);

    Ok(())
}

fn describe_remaining(remaining: Duration) -> String {
    if remaining < Duration::zero() {
        return "within clock skew of expiry".to_string();
    }
    let secs = remaining.num_seconds();
    format!("in {}h {:02}m {:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

fn describe_timestamp(secs: i64) -> String {
    match DateTime::from_timestamp(secs, 0) {
        Some(at) => format!("{at} ({secs})"),
        None => format!("{secs} (out of range)"),
    }
}
