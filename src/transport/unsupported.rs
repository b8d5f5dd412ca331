//! Placeholder transport for backends missing on this target.

// ============================================================================
// Imports
// ============================================================================

use tracing::debug;

use crate::connection::TransportEvents;
use crate::error::{Error, Result};
use crate::protocol::Message;

use super::{Backend, Transport};

// ============================================================================
// UnsupportedTransport
// ============================================================================

/// Transport whose creation always fails.
///
/// Lets a caller request any backend on any target: the failure reaches
/// listeners as an `error` event followed by `close`.
#[derive(Debug, Clone, Copy)]
pub struct UnsupportedTransport {
    backend: Backend,
}

impl UnsupportedTransport {
    /// Creates a placeholder for `backend`.
    #[inline]
    #[must_use]
    pub const fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Returns the requested backend.
    #[inline]
    #[must_use]
    pub const fn backend(&self) -> Backend {
        self.backend
    }
}

impl Transport for UnsupportedTransport {
    fn create(&self, _events: TransportEvents) -> Result<()> {
        debug!(backend = %self.backend, "Backend unavailable on this target");
        Err(Error::unsupported(format!(
            "{} backend is not available on this target",
            self.backend
        )))
    }

    fn close_channel(&self) -> Result<()> {
        Ok(())
    }

    fn send_on_channel(&self, _message: Message) -> Result<()> {
        Err(Error::ConnectionClosed)
    }
}

// ============================================================================
// Tests
// ============================================================================
