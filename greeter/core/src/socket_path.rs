//! Socket path preparation
//!
//! A socket inode left behind by an unclean shutdown makes `bind` fail with
//! "address in use", so whatever sits at the path is cleared first. How
//! aggressively that happens is decided by [`StalePathPolicy`].

use std::io;
use std::os::unix::fs::FileTypeExt;
use std::path::Path;

use tracing::{debug, warn};

use crate::client;
use crate::config::StalePathPolicy;
use crate::error::ListenerError;

/// Clear the socket path so that a subsequent bind can succeed
///
/// The parent directory is never created: a missing directory is a bind
/// failure, reported by the caller.
pub async fn prepare(path: &Path, policy: StalePathPolicy) -> Result<(), ListenerError> {
    let metadata = match tokio::fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = ?path, "Socket path is free");
            return Ok(());
        }
        Err(source) => {
            return Err(ListenerError::RemoveStale {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let file_type = metadata.file_type();

    if policy == StalePathPolicy::RemoveStaleSocket {
        if !file_type.is_socket() {
            return Err(ListenerError::NotASocket {
                path: path.to_path_buf(),
            });
        }
        if client::probe(path).await {
            return Err(ListenerError::AlreadyServing {
                path: path.to_path_buf(),
            });
        }
    }

    warn!(path = ?path, socket = file_type.is_socket(), "Removing existing entry at socket path");

    let removed = if file_type.is_dir() {
        tokio::fs::remove_dir(path).await
    } else {
        tokio::fs::remove_file(path).await
    };

    match removed {
        Ok(()) => Ok(()),
        // Someone else cleared it in the meantime
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ListenerError::RemoveStale {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Whether `path` currently names a socket
pub async fn is_socket(path: &Path) -> bool {
    tokio::fs::symlink_metadata(path)
        .await
        .map(|m| m.file_type().is_socket())
        .unwrap_or(false)
}
