//! Greeter Daemon - answers every client on a Unix socket with a fixed reply
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults (/tmp/my_unix_socket, "Hello, client!")
//! greeter-daemon
//!
//! # Custom socket path
//! greeter-daemon --socket-path /tmp/greeter.sock
//!
//! # Refuse to delete anything that is not a dead socket
//! greeter-daemon --stale-socket-only
//!
//! # Verbose logging
//! RUST_LOG=debug greeter-daemon
//! ```
//!
//! # Signals
//!
//! - `SIGTERM` / `SIGINT`: stop accepting and remove the socket file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use greeter_core::{
    Listener, ListenerConfig, StalePathPolicy, DEFAULT_READ_BUFFER_SIZE, DEFAULT_REPLY,
    DEFAULT_SOCKET_PATH,
};

/// Greeter Daemon - fixed-reply Unix socket listener
#[derive(Parser, Debug)]
#[command(name = "greeter-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Unix socket path
    #[arg(
        short = 's',
        long,
        env = "GREETER_SOCKET",
        value_name = "PATH",
        default_value = DEFAULT_SOCKET_PATH
    )]
    socket_path: PathBuf,

    /// Reply written to every client that sends data
    #[arg(short = 'r', long, env = "GREETER_REPLY", default_value = DEFAULT_REPLY)]
    reply: String,

    /// Maximum size of the chunk read from each connection
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_READ_BUFFER_SIZE)]
    read_buffer_size: usize,

    /// Only remove a pre-existing socket nobody listens on
    #[arg(long)]
    stale_socket_only: bool,

    /// Octal permission bits for the socket file (e.g. 600)
    #[arg(long, value_name = "MODE", value_parser = parse_mode)]
    socket_mode: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "GREETER_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn listener_config(&self) -> ListenerConfig {
        let policy = if self.stale_socket_only {
            StalePathPolicy::RemoveStaleSocket
        } else {
            StalePathPolicy::RemoveAny
        };

        let config = ListenerConfig::new(&self.socket_path)
            .with_reply(self.reply.as_bytes())
            .with_read_buffer_size(self.read_buffer_size)
            .with_stale_policy(policy);

        match self.socket_mode {
            Some(mode) => config.with_socket_mode(mode),
            None => config,
        }
    }
}

fn parse_mode(s: &str) -> Result<u32, String> {
    let digits = s.trim_start_matches("0o");
    match u32::from_str_radix(digits, 8) {
        Ok(mode) if mode <= 0o7777 => Ok(mode),
        Ok(mode) => Err(format!("mode {mode:o} is out of range")),
        Err(e) => Err(format!("invalid octal mode {s:?}: {e}")),
    }
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("greeter_daemon={level},greeter_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Resolves when SIGINT or SIGTERM arrives
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    info!("Greeter daemon starting");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("PID: {}", std::process::id());

    let config = args.listener_config();
    info!(socket_path = ?config.socket_path, "Socket path");

    let listener = Listener::bind(config)
        .await
        .context("Failed to start listener")?;

    match listener.run(shutdown_signal()).await {
        Ok(()) => {
            info!("Greeter daemon stopped cleanly");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Daemon stopped with error");
            Err(e.into())
        }
    }
}
