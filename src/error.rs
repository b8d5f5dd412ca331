//! Error types for uniform sockets.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! Caller misuse is returned synchronously from [`Socket::send`] and
//! [`Socket::close`]. Channel failures never are: they arrive through the
//! `error` event and are always followed by `close`.
//!
//! ```ignore
//! use uniform_socket::{Error, Socket};
//!
//! let socket = Socket::builder("ws://127.0.0.1:9000").connect()?;
//! match socket.send("hello") {
//!     Err(Error::NotOpen) => { /* wait for the open event */ }
//!     other => other?,
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Usage | [`Error::NotOpen`], [`Error::AlreadyClosing`], [`Error::AlreadyClosed`] |
//! | Configuration | [`Error::Config`], [`Error::InvalidUrl`], [`Error::Unsupported`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`], [`Error::AbnormalClosure`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`] |
//!
//! [`Socket::send`]: crate::Socket::send
//! [`Socket::close`]: crate::Socket::close

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
#[cfg(not(target_arch = "wasm32"))]
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::protocol::CloseCode;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Usage Errors
    // ========================================================================
    /// Send attempted while the connection is not open.
    #[error("Socket is not open")]
    NotOpen,

    /// Close requested while a close is already in progress.
    #[error("Socket is already waiting for closure")]
    AlreadyClosing,

    /// Close requested on a closed connection.
    #[error("Socket is already closed")]
    AlreadyClosed,

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when socket options are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Target address could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Backend or runtime not supported on this platform.
    #[error("Unsupported: {message}")]
    Unsupported {
        /// What is missing.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Channel failure reported by a transport.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// The underlying channel is gone.
    ///
    /// Returned by a transport asked to send or close after its channel task
    /// has terminated.
    #[error("Connection closed")]
    ConnectionClosed,

    /// The channel closed without a clean closing handshake.
    #[error("Connection closed abnormally with code {code}{}", fmt_reason(.reason))]
    AbnormalClosure {
        /// Close code reported by the platform.
        code: CloseCode,
        /// Close reason reported by the peer, possibly empty.
        reason: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[cfg(not(target_arch = "wasm32"))]
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

fn fmt_reason(reason: &str) -> String {
    if reason.is_empty() {
        String::new()
    } else {
        format!(": {reason}")
    }
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an unsupported backend or runtime error.
    #[inline]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an abnormal closure error.
    #[inline]
    pub fn abnormal_closure(code: CloseCode, reason: impl Into<String>) -> Self {
        Self::AbnormalClosure {
            code,
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error reports caller misuse.
    ///
    /// Usage errors never change connection state.
    #[inline]
    #[must_use]
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::NotOpen | Self::AlreadyClosing | Self::AlreadyClosed
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        #[cfg(not(target_arch = "wasm32"))]
        if matches!(self, Self::WebSocket(_)) {
            return true;
        }

        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionClosed | Self::AbnormalClosure { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
