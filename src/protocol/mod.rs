//! Payload and event types shared by every backend.
//!
//! Nothing here is framed or serialized by the crate: a [`Message`] travels
//! from the caller to the transport (and back) exactly as given.
//!
//! # Event Set
//!
//! | Event | Payload | Emitted |
//! |-------|---------|---------|
//! | `open` | none | at most once, while opening |
//! | `message` | [`Message`] | only while open |
//! | `error` | [`Error`](crate::Error) | at most once, always followed by `close` |
//! | `close` | none | exactly once |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `close_code` | Platform close codes and their meaning |
//! | `event` | Event and EventKind types |
//! | `message` | Opaque duplex payload |

// ============================================================================
// Submodules
// ============================================================================

/// Platform close codes.
pub mod close_code;

/// Observable event types.
pub mod event;

/// Opaque message payload.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use close_code::CloseCode;
pub use event::{Event, EventKind};
pub use message::Message;
