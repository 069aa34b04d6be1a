//! Per-connection handling
//!
//! Every accepted connection walks exactly one path through this state
//! machine:
//!
//! ```text
//!                 first chunk     write reply + end     drain to EOF
//!   Accepted ─────────────────► ... ─────────────────► ... ─────────────► Responded
//!      │
//!      ├── EOF before any data ─────────────────────────► Ended
//!      │
//!      └── read / write / shutdown error ───────────────► Errored
//! ```
//!
//! There is no timeout: a client that neither sends nor closes holds its
//! connection (and file descriptor) open indefinitely.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info};

/// Terminal state of a handled connection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// Data arrived, the reply was written and the write side closed
    Responded {
        /// Size of the chunk that triggered the reply
        received: usize,
    },

    /// The client closed its side before sending anything
    Ended,

    /// The transport reported an error
    Errored(io::ErrorKind),
}

impl ConnectionOutcome {
    /// Whether the connection ended on a transport error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Errored(_))
    }
}

/// Serve one connection: read a chunk, reply, close
///
/// Only the first chunk is looked at. Anything the client sends afterwards is
/// read and discarded until it closes its side: closing a Unix stream with
/// unread input resets the peer, which would cost the client its reply.
pub async fn handle_connection<S>(mut stream: S, reply: &[u8], buffer_size: usize) -> ConnectionOutcome
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; buffer_size.max(1)];

    let received = match stream.read(&mut buf).await {
        Ok(0) => {
            info!("Client disconnected");
            return ConnectionOutcome::Ended;
        }
        Ok(n) => n,
        Err(e) => {
            error!(error = %e, "Socket error");
            return ConnectionOutcome::Errored(e.kind());
        }
    };

    info!(
        bytes = received,
        data = %String::from_utf8_lossy(&buf[..received]),
        "Received data"
    );

    if let Err(e) = respond(&mut stream, reply).await {
        error!(error = %e, "Socket error");
        return ConnectionOutcome::Errored(e.kind());
    }

    debug!(reply_bytes = reply.len(), "Reply sent, output closed");

    match tokio::io::copy(&mut stream, &mut tokio::io::sink()).await {
        Ok(discarded) => info!(discarded, "Client disconnected"),
        Err(e) => debug!(error = %e, "Connection dropped after reply"),
    }

    ConnectionOutcome::Responded { received }
}

/// Write the full reply, then signal end-of-output
async fn respond<S>(stream: &mut S, reply: &[u8]) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(reply).await?;
    stream.shutdown().await
}
