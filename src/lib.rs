//! Uniform Socket - one deterministic connection lifecycle over any WebSocket.
//!
//! This library hides the differences between the browser `WebSocket` and a
//! native WebSocket client behind a single event-driven connection object.
//!
//! # Architecture
//!
//! The crate separates lifecycle from transport:
//!
//! - **Connection (core)**: state machine owning one transport, emitting
//!   `open`, `message`, `error`, `close`
//! - **Send queue (optional)**: buffers sends until `open`, then replays them
//!   in submission order
//! - **Transport (glue)**: creates the platform channel and reports what
//!   happens on it
//!
//! Key guarantees:
//!
//! - `open` fires at most once and `close` exactly once
//! - every `error` is followed by `close`, and nothing is delivered after it
//! - closing before the first scheduler tick cancels the connection attempt
//! - channel failures are never returned from a call; only caller misuse is
//!
//! # Quick Start
//!
//! ```no_run
//! use uniform_socket::{Result, Socket};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     let socket = Socket::builder("ws://127.0.0.1:9000")
//!         .send_queue(true)
//!         .connect()?;
//!
//!     socket.events().on_message(|message| println!("received {message}"));
//!     socket.events().on_close(|| println!("closed"));
//!
//!     // Buffered until the connection opens.
//!     socket.send("hello")?;
//!
//!     Ok(())
//! }
//! ```
//!
//! Natively, connections must be created on a current-thread tokio runtime.
//! On a multi-thread runtime construction fails with [`Error::Unsupported`].
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`connection`] | State machine, listeners, send queue |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Messages, events, close codes |
//! | [`socket`] | Factory, builder, options |
//! | [`transport`] | Transport trait and backends |
//!
//! # Features
//!
//! - **`native-tls`**: `wss://` support for the native backend

// ============================================================================
// Modules
// ============================================================================

/// Connection lifecycle.
///
/// - [`Connection`] - the state machine
/// - [`SendQueue`] - send-buffering decorator
/// - [`Observers`] - listener registry
pub mod connection;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Target-specific glue.
pub mod platform;

/// Messages, events and close codes.
pub mod protocol;

/// Socket factory.
///
/// Use [`Socket::builder()`] or [`Socket::connect()`] to create a socket.
pub mod socket;

/// Transport trait and backends.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Connection types
pub use connection::{Connection, ConnectionState, Listener, Observers, SendQueue, TransportEvents};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ConnectionId, ListenerId};

// Protocol types
pub use protocol::{CloseCode, Event, EventKind, Message};

// Socket types
pub use socket::{Socket, SocketBuilder, SocketOptions};

// Transport types
#[cfg(target_arch = "wasm32")]
pub use transport::BrowserTransport;
#[cfg(not(target_arch = "wasm32"))]
pub use transport::TungsteniteTransport;
pub use transport::{Backend, Transport, UnsupportedTransport};
