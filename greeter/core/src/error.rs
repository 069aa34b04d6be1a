//! Listener errors
//!
//! Only startup and teardown can fail at the listener level. Per-connection
//! failures are reported as a [`ConnectionOutcome`](crate::ConnectionOutcome)
//! and never surface here.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while preparing, binding or tearing down the socket
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The pre-existing entry at the socket path could not be removed
    #[error("Failed to remove existing entry at {path:?}: {source}")]
    RemoveStale {
        /// Socket path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The path is occupied by something other than a socket
    #[error("{path:?} exists and is not a socket; refusing to remove it")]
    NotASocket {
        /// Socket path
        path: PathBuf,
    },

    /// A live listener already answers on the path
    #[error("Another listener is already serving {path:?}")]
    AlreadyServing {
        /// Socket path
        path: PathBuf,
    },

    /// Binding the socket failed
    #[error("Failed to bind to {path:?}: {source}")]
    Bind {
        /// Socket path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Applying the configured permission bits failed
    #[error("Failed to set permissions {mode:o} on {path:?}: {source}")]
    Permissions {
        /// Socket path
        path: PathBuf,
        /// Requested mode
        mode: u32,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Removing the socket file at shutdown failed
    #[error("Failed to remove socket {path:?}: {source}")]
    Cleanup {
        /// Socket path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl ListenerError {
    /// The socket path involved in the failure
    pub fn path(&self) -> &Path {
        match self {
            Self::RemoveStale { path, .. }
            | Self::NotASocket { path }
            | Self::AlreadyServing { path }
            | Self::Bind { path, .. }
            | Self::Permissions { path, .. }
            | Self::Cleanup { path, .. } => path,
        }
    }
}
