//! Client side of the greeter exchange
//!
//! Used by `greeter-ping` and by the hardened stale-path check.

use std::io;
use std::path::Path;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tracing::debug;

/// Connect to `path`, send `payload` and collect everything until the server
/// closes the connection
///
/// An empty payload sends nothing and half-closes immediately, which the
/// server sees as a clean disconnect.
pub async fn exchange(path: &Path, payload: &[u8]) -> io::Result<Vec<u8>> {
    let mut stream = UnixStream::connect(path).await?;

    if payload.is_empty() {
        stream.shutdown().await?;
    } else {
        stream.write_all(payload).await?;
    }

    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await?;

    debug!(path = ?path, sent = payload.len(), received = reply.len(), "Exchange complete");
    Ok(reply)
}

/// Whether something is accepting connections at `path`
pub async fn probe(path: &Path) -> bool {
    match UnixStream::connect(path).await {
        Ok(_) => true,
        Err(e) => {
            debug!(path = ?path, error = %e, "Probe connect failed");
            false
        }
    }
}
