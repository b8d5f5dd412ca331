//! Connection lifecycle states.
//!
//! ```text
//! INITIALIZATION ──initiate──► OPENING ──open──► OPENED
//!       │                         │                 │
//!       │ close                   │ close / error   │ close / error
//!       ▼                         ▼                 ▼
//!    CLOSING ─────────────────────┴──────────────► CLOSED
//! ```
//!
//! A transport `close` callback moves any non-terminal state straight to
//! `CLOSED`.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

// ============================================================================
// ConnectionState
// ============================================================================

/// Lifecycle state of a [`Connection`](crate::Connection).
///
/// States only ever advance; `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    /// Constructed; transport creation not yet attempted.
    Initialization,
    /// Transport created, waiting for the channel to open.
    Opening,
    /// Channel open; sends are accepted.
    Opened,
    /// Close in progress.
    Closing,
    /// Terminal.
    Closed,
}

impl ConnectionState {
    /// Returns `true` if moving from `self` to `next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        use ConnectionState::{Closed, Closing, Initialization, Opened, Opening};

        matches!(
            (self, next),
            (Initialization, Opening | Closing | Closed)
                | (Opening, Opened | Closing | Closed)
                | (Opened, Closing | Closed)
                | (Closing, Closed)
        )
    }

    /// Returns `true` for the terminal state.
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns `true` once a close has started or finished.
    #[inline]
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closing | Self::Closed)
    }

    /// Returns `true` while a transport channel may exist.
    #[inline]
    #[must_use]
    pub const fn has_channel(&self) -> bool {
        matches!(self, Self::Opening | Self::Opened)
    }

    /// Returns the upper-case state name.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initialization => "INITIALIZATION",
            Self::Opening => "OPENING",
            Self::Opened => "OPENED",
            Self::Closing => "CLOSING",
            Self::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
