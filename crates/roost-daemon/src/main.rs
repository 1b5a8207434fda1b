// crates/roost-daemon/src/main.rs
//
// Binary entrypoint for the Roost daemon.
//
// Parses CLI arguments, loads configuration, initializes tracing, opens the
// entity store, and runs one subcommand: `ingest` feeds newline-delimited
// event batches through the dispatcher, the rest print stored rows.

mod commands;
mod config;
mod ingest;
mod input;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use config::{DaemonConfig, StoreBackend};

use roost_core::route::RouteMode;

/// Roost daemon: derives identity, room, and relay-route state from events.
#[derive(Parser, Debug)]
#[command(name = "roost-daemon", version = "0.1.0", about = "Roost event ingestion daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.roost/config.toml")]
    config: String,

    /// Hex public key of the local user (overrides the config file).
    #[arg(long)]
    local_pubkey: Option<String>,

    /// Keep all state in memory for this run.
    #[arg(long)]
    memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dispatch events read from FILE (stdin when omitted), one JSON event
    /// or array of events per line.
    Ingest { file: Option<PathBuf> },
    /// Print the ranked relay routes of an identity.
    Routes {
        pubkey: String,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print a stored identity as JSON.
    Identity { pubkey: String },
    /// Print a stored room as JSON.
    Room { id: String },
    /// Print the local user's profile as JSON.
    Profile,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Read,
    Write,
}

impl From<ModeArg> for RouteMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Read => RouteMode::Read,
            ModeArg::Write => RouteMode::Write,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let loaded = DaemonConfig::load(&args.config);
    let mut daemon_config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => DaemonConfig::default(),
    };

    // CLI flags override the config file.
    if args.local_pubkey.is_some() {
        daemon_config.local_pubkey = args.local_pubkey.clone();
    }
    if args.memory {
        daemon_config.backend = StoreBackend::Memory;
    }

    // Logs go to stderr so subcommand output on stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&daemon_config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match loaded {
        Ok(_) => tracing::info!("Loaded configuration from {}", args.config),
        Err(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            args.config,
            e
        ),
    }

    tracing::debug!("Backend: {:?}", daemon_config.backend);
    if let Some(pubkey) = &daemon_config.local_pubkey {
        tracing::info!("Local user: {}", pubkey);
    }

    let store = commands::open_store(&daemon_config)?;

    match args.command {
        Command::Ingest { file } => ingest::run(&daemon_config, store, file).await?,
        Command::Routes {
            pubkey,
            mode,
            limit,
        } => commands::print_routes(
            &daemon_config,
            store,
            &pubkey,
            mode.map(RouteMode::from),
            limit,
        )?,
        Command::Identity { pubkey } => commands::print_identity(&store, &pubkey)?,
        Command::Room { id } => commands::print_room(&store, &id)?,
        Command::Profile => commands::print_profile(&store)?,
    }

    Ok(())
}
