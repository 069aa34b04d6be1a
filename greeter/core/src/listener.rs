//! Unix Socket Listener
//!
//! Owns the bound socket for its whole lifetime and runs the accept loop.
//! Each accepted connection is handed to its own task, so a failure in one
//! connection never reaches the loop or any other connection.

use std::future::Future;
use std::io;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;
use std::sync::Arc;

use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn, Instrument};

use crate::config::ListenerConfig;
use crate::connection::{handle_connection, ConnectionOutcome};
use crate::error::ListenerError;
use crate::socket_path;

/// Capacity of the outcome channel handed out by [`Listener::outcomes`]
const OUTCOME_CAPACITY: usize = 256;

/// Device and inode of the socket file this listener created
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SocketId {
    dev: u64,
    ino: u64,
}

impl SocketId {
    fn of(metadata: &impl MetadataExt) -> Self {
        Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        }
    }
}

/// A bound greeter socket
pub struct Listener {
    config: ListenerConfig,
    listener: UnixListener,
    socket_id: Option<SocketId>,
    outcome_tx: Option<mpsc::Sender<ConnectionOutcome>>,
}

impl Listener {
    /// Prepare the socket path and bind
    ///
    /// Any failure here is fatal for the process: there is no retry.
    pub async fn bind(config: ListenerConfig) -> Result<Self, ListenerError> {
        socket_path::prepare(&config.socket_path, config.stale_policy).await?;

        let listener =
            UnixListener::bind(&config.socket_path).map_err(|source| ListenerError::Bind {
                path: config.socket_path.clone(),
                source,
            })?;

        if let Some(mode) = config.socket_mode {
            apply_mode(&config.socket_path, mode).await?;
        }

        let socket_id = tokio::fs::symlink_metadata(&config.socket_path)
            .await
            .ok()
            .map(|m| SocketId::of(&m));

        info!(path = ?config.socket_path, "Unix socket server started");

        Ok(Self {
            config,
            listener,
            socket_id,
            outcome_tx: None,
        })
    }

    /// Path the listener is bound to
    pub fn socket_path(&self) -> &Path {
        &self.config.socket_path
    }

    /// Active configuration
    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Report the terminal state of every connection accepted from now on
    ///
    /// Outcomes are dropped, not queued, once the channel is full or the
    /// receiver is gone; connection handling never waits on it.
    pub fn outcomes(&mut self) -> mpsc::Receiver<ConnectionOutcome> {
        let (tx, rx) = mpsc::channel(OUTCOME_CAPACITY);
        self.outcome_tx = Some(tx);
        rx
    }

    /// Accept connections forever
    pub async fn serve(self) -> Result<(), ListenerError> {
        self.run(std::future::pending()).await
    }

    /// Accept connections until `shutdown` completes, then remove the socket
    /// file
    ///
    /// The file is only removed while it is still the one this listener
    /// bound; a socket another instance created at the same path is kept.
    ///
    /// Connections already being handled are left to finish on their own.
    pub async fn run<F>(self, shutdown: F) -> Result<(), ListenerError>
    where
        F: Future<Output = ()>,
    {
        let Self {
            config,
            listener,
            socket_id,
            outcome_tx,
        } = self;
        let reply: Arc<[u8]> = Arc::from(config.reply.as_slice());

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("Shutdown requested, stopping accept loop");
                    break;
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, _addr)) => {
                            spawn_handler(
                                stream,
                                Arc::clone(&reply),
                                config.read_buffer_size,
                                outcome_tx.clone(),
                            );
                        }
                        Err(e) => {
                            error!(error = %e, "Accept failed");
                        }
                    }
                }
            }
        }

        drop(listener);
        remove_socket(&config.socket_path, socket_id).await
    }
}

/// Handle one connection on its own task
fn spawn_handler(
    stream: UnixStream,
    reply: Arc<[u8]>,
    buffer_size: usize,
    outcome_tx: Option<mpsc::Sender<ConnectionOutcome>>,
) {
    let (peer_pid, peer_uid) = match stream.peer_cred() {
        Ok(cred) => (cred.pid(), Some(cred.uid())),
        Err(_) => (None, None),
    };

    let span = tracing::info_span!("connection", peer_pid = ?peer_pid);

    tokio::spawn(
        async move {
            info!(peer_uid = ?peer_uid, "Client connected");
            let outcome = handle_connection(stream, &reply, buffer_size).await;
            debug!(outcome = ?outcome, "Connection handler finished");

            if let Some(tx) = outcome_tx {
                let _ = tx.try_send(outcome);
            }
        }
        .instrument(span),
    );
}

async fn apply_mode(path: &Path, mode: u32) -> Result<(), ListenerError> {
    let to_error = |source: io::Error| ListenerError::Permissions {
        path: path.to_path_buf(),
        mode,
        source,
    };

    let mut perms = tokio::fs::metadata(path).await.map_err(to_error)?.permissions();
    perms.set_mode(mode);
    tokio::fs::set_permissions(path, perms)
        .await
        .map_err(to_error)
}

async fn remove_socket(path: &Path, owned: Option<SocketId>) -> Result<(), ListenerError> {
    if let Some(owned) = owned {
        match tokio::fs::symlink_metadata(path).await {
            Ok(metadata) if SocketId::of(&metadata) != owned => {
                warn!(path = ?path, "Socket path was taken over by another listener, leaving it");
                return Ok(());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            _ => {}
        }
    }

    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            info!(path = ?path, "Socket file removed");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ListenerError::Cleanup {
            path: path.to_path_buf(),
            source,
        }),
    }
}
