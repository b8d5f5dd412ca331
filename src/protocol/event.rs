//! Observable event types.
//!
//! Every connection emits the same four events regardless of the backend
//! carrying it.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::Message;

// ============================================================================
// EventKind
// ============================================================================

/// Name of an observable event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Channel became usable.
    Open,
    /// Inbound payload.
    Message,
    /// Channel failure.
    Error,
    /// Connection reached its terminal state.
    Close,
}

impl EventKind {
    /// All event kinds, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Open, Self::Message, Self::Error, Self::Close];

    /// Returns the event name.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Message => "message",
            Self::Error => "error",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "open" => Ok(Self::Open),
            "message" => Ok(Self::Message),
            "error" => Ok(Self::Error),
            "close" => Ok(Self::Close),
            other => Err(Error::config(format!("Unknown event: {other}"))),
        }
    }
}

// ============================================================================
// Event
// ============================================================================

/// An event delivered to listeners.
///
/// Listeners receive events by reference; the payload is owned by the
/// emission and dropped once every listener has run.
#[derive(Debug)]
pub enum Event {
    /// The channel opened.
    Open,
    /// A payload arrived, unchanged from the transport.
    Message(Message),
    /// The channel failed. A [`Event::Close`] always follows.
    Error(Error),
    /// The connection closed.
    Close,
}

impl Event {
    /// Returns the kind of this event.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Open => EventKind::Open,
            Self::Message(_) => EventKind::Message,
            Self::Error(_) => EventKind::Error,
            Self::Close => EventKind::Close,
        }
    }

    /// Returns the message payload, if any.
    #[inline]
    #[must_use]
    pub const fn message(&self) -> Option<&Message> {
        match self {
            Self::Message(message) => Some(message),
            _ => None,
        }
    }

    /// Returns the failure, if any.
    #[inline]
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
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
    fn test_kind_names_roundtrip() {
        for kind in EventKind::ALL {
            let parsed: EventKind = kind.as_str().parse().expect("known name");
            assert_eq!(parsed, kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = "connect".parse::<EventKind>().unwrap_err();
        assert!(err.to_string().contains("connect"));
    }

    #[test]
    fn test_kind_serde_lowercase() {
        let json = serde_json::to_string(&EventKind::Message).expect("serialize");
        assert_eq!(json, "\"message\"");
        let kind: EventKind = serde_json::from_str("\"close\"").expect("deserialize");
        assert_eq!(kind, EventKind::Close);
    }

    #[test]
    fn test_event_accessors() {
        let event = Event::Message(Message::from("payload"));
        assert_eq!(event.kind(), EventKind::Message);
        assert_eq!(event.message(), Some(&Message::from("payload")));
        assert!(event.error().is_none());

        let event = Event::Error(Error::ConnectionClosed);
        assert_eq!(event.kind(), EventKind::Error);
        assert!(matches!(event.error(), Some(Error::ConnectionClosed)));
        assert!(event.message().is_none());

        assert_eq!(Event::Open.kind(), EventKind::Open);
        assert_eq!(Event::Close.kind(), EventKind::Close);
    }
}
