//! Transport backends.
//!
//! A [`Transport`] owns one platform channel and reports what happens on it
//! through [`TransportEvents`]. The [`Connection`](crate::Connection) state
//! machine decides when each primitive may run, so a transport never tracks
//! lifecycle state of its own.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  create / send_on_channel   ┌─────────────────┐
//! │  Connection  │────────────────────────────►│    Transport    │
//! │              │       close_channel         │                 │
//! │ (lifecycle)  │◄────────────────────────────│ (platform glue) │
//! └──────────────┘  open/message/error/close   └─────────────────┘
//! ```
//!
//! # Backends
//!
//! | Backend | Target | Type |
//! |---------|--------|------|
//! | `native` | everything but `wasm32` | [`TungsteniteTransport`] |
//! | `browser` | `wasm32` | `BrowserTransport` |
//!
//! Requesting a backend that is not compiled for the current target yields
//! an [`UnsupportedTransport`], whose creation fails through the regular
//! `error` then `close` path.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::connection::TransportEvents;
use crate::error::{Error, Result};
use crate::platform::MaybeSendSync;
use crate::protocol::Message;

// ============================================================================
// Submodules
// ============================================================================

/// Browser backend over `web_sys::WebSocket`.
#[cfg(target_arch = "wasm32")]
pub mod browser;

/// Native backend over `tokio-tungstenite`.
#[cfg(not(target_arch = "wasm32"))]
pub mod native;

/// Placeholder for backends missing on this target.
pub mod unsupported;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserTransport;
#[cfg(not(target_arch = "wasm32"))]
pub use native::TungsteniteTransport;
pub use unsupported::UnsupportedTransport;

// ============================================================================
// Transport
// ============================================================================

/// Channel primitives a backend provides.
///
/// Implementations use interior mutability: the connection calls every
/// method through `&self` and never while holding its state lock.
///
/// The connection guarantees:
///
/// - `create` is called at most once
/// - `close_channel` is called at most once, and only after `create`
/// - `send_on_channel` is only called after `open` was reported and before
///   the connection started closing
pub trait Transport: MaybeSendSync {
    /// Starts establishing the channel.
    ///
    /// Must report `open` or `error` through `events` later, possibly from
    /// another task.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel cannot even be attempted. The
    /// connection reports it as an `error` event.
    fn create(&self, events: TransportEvents) -> Result<()>;

    /// Tears the channel down.
    ///
    /// # Errors
    ///
    /// Failures are logged by the connection and otherwise ignored.
    fn close_channel(&self) -> Result<()>;

    /// Transmits `message` unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel cannot accept the message.
    fn send_on_channel(&self, message: Message) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn create(&self, events: TransportEvents) -> Result<()> {
        (**self).create(events)
    }

    fn close_channel(&self) -> Result<()> {
        (**self).close_channel()
    }

    fn send_on_channel(&self, message: Message) -> Result<()> {
        (**self).send_on_channel(message)
    }
}

// ============================================================================
// Backend
// ============================================================================

/// Which platform channel carries a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// The host browser's `WebSocket`.
    Browser,
    /// `tokio-tungstenite`.
    Native,
}

impl Backend {
    /// Returns the backend compiled for the current target.
    #[inline]
    #[must_use]
    pub const fn detect() -> Self {
        if cfg!(target_arch = "wasm32") {
            Self::Browser
        } else {
            Self::Native
        }
    }

    /// Returns `true` if this backend is compiled for the current target.
    #[inline]
    #[must_use]
    pub fn is_available(&self) -> bool {
        *self == Self::detect()
    }

    /// Returns the backend name.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Native => "native",
        }
    }

    /// Builds a transport for `url`.
    ///
    /// The URL is validated when the transport is created, so an invalid
    /// one surfaces as an `error` event.
    #[must_use]
    pub fn into_transport(self, url: &str) -> Box<dyn Transport> {
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            Self::Native => Box::new(TungsteniteTransport::new(url)),
            #[cfg(target_arch = "wasm32")]
            Self::Browser => Box::new(BrowserTransport::new(url)),
            other => Box::new(UnsupportedTransport::new(other)),
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::detect()
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "browser" => Ok(Self::Browser),
            "native" => Ok(Self::Native),
            other => Err(Error::config(format!("Unknown backend: {other}"))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_is_available() {
        assert!(Backend::detect().is_available());
        assert_eq!(Backend::default(), Backend::detect());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_detect_native() {
        assert_eq!(Backend::detect(), Backend::Native);
        assert!(!Backend::Browser.is_available());
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("browser".parse::<Backend>().ok(), Some(Backend::Browser));
        assert_eq!("native".parse::<Backend>().ok(), Some(Backend::Native));
        assert!("node".parse::<Backend>().is_err());
        assert_eq!(Backend::Native.to_string(), "native");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Backend::Browser).expect("serialize");
        assert_eq!(json, "\"browser\"");

        let backend: Backend = serde_json::from_str("\"native\"").expect("deserialize");
        assert_eq!(backend, Backend::Native);
    }
}
