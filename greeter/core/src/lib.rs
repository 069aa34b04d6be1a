//! Greeter Core - a single-purpose Unix domain socket listener
//!
//! The listener binds a socket at a fixed path, accepts connections one at a
//! time, and for each one reads a single chunk, logs it, writes a fixed reply
//! and closes. There is no framing and no state shared between connections.
//!
//! ```text
//!   start ─► clear socket path ─► bind ─► accept ──┬──► connection task
//!                                           ▲      │      read chunk
//!                                           │      │      log payload
//!                                           └──────┘      write reply, close
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use greeter_core::{Listener, ListenerConfig};
//!
//! # async fn demo() -> Result<(), greeter_core::ListenerError> {
//! let listener = Listener::bind(ListenerConfig::new("/tmp/my_unix_socket")).await?;
//! listener.serve().await
//! # }
//! ```
//!
//! # Known limitations
//!
//! Connections have no idle timeout. A client that connects and never sends
//! nor closes holds a file descriptor until the peer or the OS gives up.

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod listener;
pub mod socket_path;

pub use config::{
    ListenerConfig, StalePathPolicy, DEFAULT_READ_BUFFER_SIZE, DEFAULT_REPLY, DEFAULT_SOCKET_PATH,
};
pub use connection::{handle_connection, ConnectionOutcome};
pub use error::ListenerError;
pub use listener::Listener;
