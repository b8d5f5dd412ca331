//! Builder pattern for socket construction.
//!
//! # Example
//!
//! ```ignore
//! use uniform_socket::Socket;
//!
//! let socket = Socket::builder("ws://127.0.0.1:9000")
//!     .send_queue(true)
//!     .connect()?;
//!
//! socket.send("queued until open")?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use crate::error::Result;
use crate::transport::{Backend, Transport};

use super::core::Socket;
use super::options::SocketOptions;

// ============================================================================
// SocketBuilder
// ============================================================================

/// Builder for a [`Socket`].
///
/// Use [`Socket::builder()`] to create one.
#[derive(Debug, Clone)]
pub struct SocketBuilder {
    options: SocketOptions,
}

impl SocketBuilder {
    /// Creates a builder for `url`.
    #[inline]
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            options: SocketOptions::new(url),
        }
    }

    /// Buffers sends until the connection opens.
    #[inline]
    #[must_use]
    pub fn send_queue(mut self, enabled: bool) -> Self {
        self.options.send_queue = enabled;
        self
    }

    /// Selects a backend instead of detecting it.
    #[inline]
    #[must_use]
    pub fn backend(mut self, backend: Backend) -> Self {
        self.options.backend = Some(backend);
        self
    }

    /// Returns the options built so far.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &SocketOptions {
        &self.options
    }

    /// Builds the socket over the selected backend.
    ///
    /// # Errors
    ///
    /// See [`Socket::connect`].
    pub fn connect(self) -> Result<Socket> {
        Socket::connect(self.options)
    }

    /// Builds the socket over a caller-supplied transport.
    ///
    /// The URL and backend options are not consulted.
    ///
    /// # Errors
    ///
    /// See [`Connection::new`](crate::Connection::new).
    pub fn connect_with(self, transport: impl Transport + 'static) -> Result<Socket> {
        Socket::connect_with(transport, self.options.send_queue)
    }
}

impl From<SocketOptions> for SocketBuilder {
    fn from(options: SocketOptions) -> Self {
        Self { options }
    }
}

// ============================================================================
// Tests
// ============================================================================
