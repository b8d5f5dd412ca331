//! Platform close codes.
//!
//! Close codes follow RFC 6455 Section 7.4.1. Browsers report them on the
//! `close` event; tungstenite reports them in close frames.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// Constants
// ============================================================================

const UNKNOWN_REASON: &str = "Unknown reason";

// ============================================================================
// CloseCode
// ============================================================================

/// A close code reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CloseCode(u16);

impl CloseCode {
    /// Purpose of the connection fulfilled.
    pub const NORMAL: Self = Self(1000);
    /// Endpoint going away (server shutdown, page navigation).
    pub const GOING_AWAY: Self = Self(1001);
    /// Protocol error.
    pub const PROTOCOL_ERROR: Self = Self(1002);
    /// Unacceptable data type.
    pub const UNSUPPORTED_DATA: Self = Self(1003);
    /// No status code present.
    pub const NO_STATUS: Self = Self(1005);
    /// Closed without a close frame.
    pub const ABNORMAL: Self = Self(1006);
    /// Payload inconsistent with the message type.
    pub const INVALID_PAYLOAD: Self = Self(1007);
    /// Policy violation.
    pub const POLICY_VIOLATION: Self = Self(1008);
    /// Message too big.
    pub const MESSAGE_TOO_BIG: Self = Self(1009);
    /// Required extension not negotiated.
    pub const MISSING_EXTENSION: Self = Self(1010);
    /// Unexpected server condition.
    pub const INTERNAL_ERROR: Self = Self(1011);
    /// TLS handshake failure.
    pub const TLS_HANDSHAKE: Self = Self(1015);

    /// Creates a close code from its numeric value.
    #[inline]
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric value.
    #[inline]
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns `true` for codes that end a connection normally.
    #[inline]
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        matches!(self.0, 1000 | 1001)
    }

    /// Returns a human-readable description of the code.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self.0 {
            1000 => "Normal closure; the purpose of the connection was fulfilled",
            1001 => "An endpoint is going away, such as a server shutting down or a page being left",
            1002 => "An endpoint terminated the connection due to a protocol error",
            1003 => "An endpoint received a type of data it cannot accept",
            1004 => "Reserved",
            1005 => "No status code was present",
            1006 => "The connection was closed abnormally, without a close frame",
            1007 => "An endpoint received data inconsistent with the message type",
            1008 => "An endpoint received a message that violates its policy",
            1009 => "An endpoint received a message too big to process",
            1010 => {
                "The client expected the server to negotiate one or more extensions, \
                 but the server did not"
            }
            1011 => "The server encountered an unexpected condition",
            1015 => "The TLS handshake failed",
            _ => UNKNOWN_REASON,
        }
    }
}

impl From<u16> for CloseCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.0
    }
}

impl fmt::Display for CloseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.description())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_have_descriptions() {
        for code in [1000, 1001, 1002, 1003, 1005, 1006, 1007, 1008, 1009, 1010, 1011, 1015] {
            assert_ne!(CloseCode::new(code).description(), UNKNOWN_REASON, "{code}");
        }
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(CloseCode::new(4000).description(), UNKNOWN_REASON);
        assert_eq!(CloseCode::new(1012).description(), UNKNOWN_REASON);
    }

    #[test]
    fn test_display_includes_code_and_description() {
        let text = CloseCode::ABNORMAL.to_string();
        assert!(text.starts_with("1006 ("));
        assert!(text.contains("abnormally"));
    }

    #[test]
    fn test_is_clean() {
        assert!(CloseCode::NORMAL.is_clean());
        assert!(CloseCode::GOING_AWAY.is_clean());
        assert!(!CloseCode::ABNORMAL.is_clean());
        assert!(!CloseCode::PROTOCOL_ERROR.is_clean());
    }

    #[test]
    fn test_u16_conversions() {
        let code = CloseCode::from(1011);
        assert_eq!(code, CloseCode::INTERNAL_ERROR);
        assert_eq!(u16::from(code), 1011);
    }
}
