//! Listener Configuration
//!
//! Every knob has a default that reproduces the fixed behaviour of the
//! greeter: socket at `/tmp/my_unix_socket`, reply `Hello, client!`, any
//! pre-existing entry at the path removed before binding.

use std::path::{Path, PathBuf};

/// Default socket path
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/my_unix_socket";

/// Default reply written to every client that sends data
pub const DEFAULT_REPLY: &str = "Hello, client!";

/// Default size of the single read performed per connection
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

/// What to do with an entry already present at the socket path
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StalePathPolicy {
    /// Delete whatever is there, regardless of file type
    #[default]
    RemoveAny,

    /// Only delete a socket nobody is listening on
    ///
    /// Regular files, directories and live sockets are left untouched and
    /// binding fails instead.
    RemoveStaleSocket,
}

/// Configuration for a [`Listener`](crate::Listener)
#[derive(Clone, Debug)]
pub struct ListenerConfig {
    /// Filesystem path of the socket
    pub socket_path: PathBuf,

    /// Bytes written back after the first chunk of client data
    pub reply: Vec<u8>,

    /// Upper bound on the first chunk read from a connection
    ///
    /// Only this chunk is logged; the reply does not depend on it.
    pub read_buffer_size: usize,

    /// Policy for a pre-existing entry at `socket_path`
    pub stale_policy: StalePathPolicy,

    /// Permission bits applied to the socket file after bind (None = umask default)
    pub socket_mode: Option<u32>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SOCKET_PATH)
    }
}

impl ListenerConfig {
    /// Create a configuration for the given socket path with default settings
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            reply: DEFAULT_REPLY.as_bytes().to_vec(),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            stale_policy: StalePathPolicy::default(),
            socket_mode: None,
        }
    }

    /// Set the reply sent to clients
    #[must_use]
    pub fn with_reply(mut self, reply: impl Into<Vec<u8>>) -> Self {
        self.reply = reply.into();
        self
    }

    /// Set the read buffer size (clamped to at least one byte)
    #[must_use]
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }

    /// Set the stale path policy
    #[must_use]
    pub fn with_stale_policy(mut self, policy: StalePathPolicy) -> Self {
        self.stale_policy = policy;
        self
    }

    /// Set explicit permission bits for the socket file
    #[must_use]
    pub fn with_socket_mode(mut self, mode: u32) -> Self {
        self.socket_mode = Some(mode);
        self
    }

    /// Socket path
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}
