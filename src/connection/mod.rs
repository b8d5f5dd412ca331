//! Connection lifecycle.
//!
//! This module contains the transport-independent core:
//!
//! - [`Connection`] - state machine driving one [`Transport`](crate::Transport)
//! - [`ConnectionState`] - the five lifecycle states
//! - [`Observers`] - listener registry for `open`, `message`, `error`, `close`
//! - [`SendQueue`] - decorator buffering sends until `open`
//! - [`TransportEvents`] - callback surface handed to transports

// ============================================================================
// Submodules
// ============================================================================

/// State machine and transport callback surface.
pub mod core;

/// Listener registry.
pub mod observers;

/// Send-buffering decorator.
pub mod send_queue;

/// Lifecycle states.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use core::{Connection, TransportEvents};
pub use observers::{Listener, Observers};
pub use send_queue::SendQueue;
pub use state::ConnectionState;
