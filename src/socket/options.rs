//! Socket construction options.
//!
//! # Example
//!
//! ```ignore
//! use uniform_socket::SocketOptions;
//!
//! let options = SocketOptions::from_json(r#"{ "url": "ws://127.0.0.1:9000", "sendQueue": true }"#)?;
//! assert!(options.send_queue);
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::transport::Backend;

// ============================================================================
// SocketOptions
// ============================================================================

/// Options accepted by [`Socket::connect`](crate::Socket::connect).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketOptions {
    /// Address of the remote endpoint.
    pub url: String,

    /// Buffer sends until the connection opens.
    #[serde(default, alias = "send_queue")]
    pub send_queue: bool,

    /// Backend to use. Detected from the target when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<Backend>,
}

// ============================================================================
// Constructors
// ============================================================================

impl SocketOptions {
    /// Creates options for `url` with every other setting at its default.
    #[inline]
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            send_queue: false,
            backend: None,
        }
    }

    /// Parses options from a JSON object.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if `json` is not a valid options object
    /// - [`Error::Config`] if the options fail validation
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl SocketOptions {
    /// Enables or disables the send queue.
    #[inline]
    #[must_use]
    pub fn with_send_queue(mut self, enabled: bool) -> Self {
        self.send_queue = enabled;
        self
    }

    /// Selects a backend explicitly.
    #[inline]
    #[must_use]
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl SocketOptions {
    /// Returns the configured backend, or the one detected for this target.
    #[inline]
    #[must_use]
    pub fn resolved_backend(&self) -> Backend {
        self.backend.unwrap_or_else(Backend::detect)
    }

    /// Validates the options.
    ///
    /// The URL itself is parsed by the transport, so a malformed one is
    /// reported through the `error` event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL is empty.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::config("url must not be empty"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
