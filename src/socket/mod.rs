//! Socket factory.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Socket`] | Connection returned by the factory |
//! | [`SocketBuilder`] | Fluent configuration builder |
//! | [`SocketOptions`] | Serializable construction options |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder.
pub mod builder;

/// Socket factory and surface.
pub mod core;

/// Construction options.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::SocketBuilder;
pub use core::Socket;
pub use options::SocketOptions;
