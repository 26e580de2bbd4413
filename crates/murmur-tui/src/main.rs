//! murmur terminal client entry point.

use std::{
    fs::File,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use clap::Parser;
use murmur_app::{FileStore, Runtime};
use murmur_client::{ReconnectPolicy, TransportConfig};
use murmur_harness::{SimServer, SystemClock};
use murmur_tui::{Connection, TerminalDriver};
use tracing_subscriber::EnvFilter;

/// Fallback preference file when the platform has no config directory.
const LOCAL_PREFERENCES: &str = "murmur-preferences.json";

/// murmur terminal chat client
#[derive(Parser, Debug)]
#[command(name = "murmur")]
#[command(about = "Terminal client for a real-time group chat room")]
#[command(version)]
struct Args {
    /// Chat server base URL, e.g. `http://localhost:5000`
    ///
    /// If not provided, runs offline against an in-process room.
    #[arg(short, long)]
    server: Option<String>,

    /// Display name to join with, instead of the remembered one
    #[arg(short, long)]
    name: Option<String>,

    /// Preference file (defaults to the platform config directory)
    #[arg(long)]
    preferences: Option<PathBuf>,

    /// Write logs to this file. Without it nothing is logged, since the
    /// terminal belongs to the UI.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter directive; `RUST_LOG` takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Reconnect attempts before giving up on a dropped link
    #[arg(long, default_value_t = ReconnectPolicy::default().max_attempts)]
    max_reconnect_attempts: u32,
}

fn init_logging(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };

    let file = File::create(path)?;
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&args.log_level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&args)?;

    let preferences = args
        .preferences
        .clone()
        .or_else(FileStore::default_path)
        .unwrap_or_else(|| PathBuf::from(LOCAL_PREFERENCES));
    let store = FileStore::new(preferences);

    let (connection, label) = match args.server {
        Some(server) => {
            let mut config = TransportConfig::new(server.clone());
            config.reconnect.max_attempts = args.max_reconnect_attempts;
            (Connection::Online(config), server)
        },
        None => {
            let room = Arc::new(Mutex::new(SimServer::with_clock(SystemClock)));
            (Connection::Offline(room), "offline".to_string())
        },
    };
    tracing::info!(server = %label, "starting");

    let driver = TerminalDriver::new(connection)?;
    let mut runtime = Runtime::new(driver, store, label);
    if let Some(name) = args.name {
        runtime = runtime.with_initial_name(name);
    }

    Ok(runtime.run().await?)
}
