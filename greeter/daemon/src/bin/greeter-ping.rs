//! Greeter Ping - send one payload to a greeter socket and print the reply
//!
//! ```bash
//! greeter-ping                      # sends "ping" to /tmp/my_unix_socket
//! greeter-ping -s /tmp/g.sock hello
//! greeter-ping --empty              # connect and close without sending
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use greeter_core::{client, DEFAULT_SOCKET_PATH};

/// Send a payload to a greeter daemon and print what comes back
#[derive(Parser, Debug)]
#[command(name = "greeter-ping")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Unix socket path
    #[arg(
        short = 's',
        long,
        env = "GREETER_SOCKET",
        value_name = "PATH",
        default_value = DEFAULT_SOCKET_PATH
    )]
    socket_path: PathBuf,

    /// Payload to send
    #[arg(default_value = "ping")]
    payload: String,

    /// Send nothing; just connect and half-close
    #[arg(long, conflicts_with = "payload")]
    empty: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let payload: &[u8] = if args.empty { b"" } else { args.payload.as_bytes() };

    let reply = client::exchange(&args.socket_path, payload)
        .await
        .with_context(|| format!("Exchange with {:?} failed", args.socket_path))?;

    debug!(bytes = reply.len(), "Reply received");
    println!("{}", String::from_utf8_lossy(&reply));
    Ok(())
}
