mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "vessel", version, about = "Vessel session token CLI")]
struct Cli {
    /// Log verification details (same as RUST_LOG=debug)
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify a session token and any attestations presented with it.
    Verify {
        /// Session token, or a path to a file containing one
        token: String,

        /// Permitted scope (server name). Repeatable; replaces the configured list.
        #[arg(long = "scope")]
        scopes: Vec<String>,

        /// Name attestation token (or path)
        #[arg(long)]
        name: Option<String>,

        /// Email attestation token (or path)
        #[arg(long)]
        email: Option<String>,

        /// SMS attestation token (or path)
        #[arg(long)]
        sms: Option<String>,

        /// Path to vessel.yaml
        #[arg(long, short = 'c', env = "VESSEL_CONFIG")]
        config: Option<PathBuf>,

        /// Print the session as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Decode a session token without verifying it.
    Inspect {
        /// Session token, or a path to a file containing one
        token: String,
    },

    /// Show the attestation trust anchor in use.
    Anchor {
        /// Path to vessel.yaml
        #[arg(long, short = 'c', env = "VESSEL_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Validate a configuration file and load its trust anchor.
    CheckConfig {
        /// Path to vessel.yaml
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Verify {
            token,
            scopes,
            name,
            email,
            sms,
            config,
            json,
        } => commands::token::verify(commands::token::VerifyArgs {
            token,
            scopes,
            name,
            email,
            sms,
            config,
            json,
        })?,

        Command::Inspect { token } => commands::token::inspect(token)?,

        Command::Anchor { config } => commands::keys::show_anchor(config)?,

        Command::CheckConfig { file } => commands::config::check(file)?,
    }

    Ok(())
}
