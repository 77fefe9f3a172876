//! Zork Signaling Relay
//!
//! Connects to a getter and a giver zork peer, assigns their roles and
//! relays signaling lines between them until one side closes.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use zork_core::Settings;
use zork_core::config::load_settings;
use zork_core::tracing_init::{DEFAULT_FILTER, filter_for_level, init_tracing};
use zork_relay::{ExitStatus, PeerAddr, RelayConfig, RelayError, run_session};

#[derive(Parser, Debug)]
#[command(name = "zork-relay")]
#[command(
    version,
    about = "Relay signaling lines between a zork getter and giver"
)]
struct Args {
    /// Host of the zork peer that becomes the getter.
    getter_host: String,

    /// Port of the getter's zork server.
    getter_port: u16,

    /// Host of the zork peer that becomes the giver.
    giver_host: String,

    /// Port of the giver's zork server.
    giver_port: u16,

    /// Forward stdin lines to the getter before the handshake.
    #[arg(long, env = "ZORK_RELAY_STDIN")]
    stdin: bool,

    /// Seconds to wait for each peer connection.
    #[arg(long)]
    connect_timeout: Option<u64>,

    /// Longest accepted signal in bytes.
    #[arg(long)]
    max_signal_bytes: Option<usize>,

    /// Settings file (JSON). Defaults to ~/.config/zork/relay.json if present.
    #[arg(long, env = "ZORK_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level or filter directive (e.g. "debug", "zork_relay=trace").
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "ZORK_RELAY_LOG_JSON")]
    log_json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match resolve_settings(&args) {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing(DEFAULT_FILTER, args.log_json);
            error!(error = ?e, "Invalid configuration");
            return ExitStatus::Config.into();
        }
    };
    init_tracing(&filter_for_level(&settings.log_level), args.log_json);

    let mut config = RelayConfig::new(
        PeerAddr::new(args.getter_host, args.getter_port),
        PeerAddr::new(args.giver_host, args.giver_port),
        &settings,
    );
    config.stdin_passthrough = args.stdin;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        getter = %config.getter,
        giver = %config.giver,
        passthrough = config.stdin_passthrough,
        "Starting zork-relay"
    );

    match run_session(&config, tokio::io::stdin()).await {
        Ok(summary) => {
            info!(
                reason = %summary.termination,
                getter_to_giver = summary.getter_to_giver,
                giver_to_getter = summary.giver_to_getter,
                "Relay finished"
            );
            ExitStatus::Clean.into()
        }
        Err(e) => {
            error!(error = %e, "Relay failed");
            ExitStatus::from(&e).into()
        }
    }
}

/// Settings file and environment first, then command line overrides.
fn resolve_settings(args: &Args) -> anyhow::Result<Settings> {
    let mut settings = load_settings(args.config.as_deref())
        .map_err(RelayError::Config)
        .context("loading relay settings")?;

    if let Some(secs) = args.connect_timeout {
        settings.connect_timeout_secs = secs;
    }
    if let Some(max) = args.max_signal_bytes {
        settings.max_signal_bytes = max;
    }
    if let Some(level) = &args.log_level {
        settings.log_level.clone_from(level);
    }

    settings
        .validate()
        .map_err(RelayError::Config)
        .context("validating command line options")?;
    Ok(settings)
}
