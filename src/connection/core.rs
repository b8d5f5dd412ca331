//! Connection lifecycle state machine.
//!
//! A [`Connection`] owns one [`Transport`] and turns its callbacks into the
//! four observable events with a fixed contract:
//!
//! - `open` fires at most once, only while opening
//! - `message` fires only while open
//! - every `error` is followed by exactly one `close`
//! - `close` fires exactly once
//!
//! # Initiation
//!
//! Transport creation is deferred to the next scheduler tick. A caller that
//! closes the connection right after constructing it (before yielding)
//! cancels creation: `close` fires and no channel is ever opened.
//!
//! Natively this needs a current-thread tokio runtime; constructing a
//! connection on a multi-thread runtime fails with
//! [`Error::Unsupported`]. Transports may still report events from any
//! thread.
//!
//! # Dispatch
//!
//! Each transition together with the events it emits runs under a re-entrant
//! dispatch guard. Another thread observes the connection either before or
//! after a transition, never in between, while listeners on the dispatching
//! thread may call back into the connection.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::ConnectionId;
use crate::platform;
use crate::protocol::{Event, Message};
use crate::transport::Transport;

use super::observers::Observers;
use super::state::ConnectionState;

// ============================================================================
// Shared
// ============================================================================

/// State shared by every handle of one connection.
struct Shared {
    id: ConnectionId,
    dispatch: ReentrantMutex<()>,
    state: Mutex<ConnectionState>,
    transport: Box<dyn Transport>,
    observers: Observers,
}

impl Shared {
    fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// Moves to `next`. Caller holds the dispatch guard.
    fn advance(&self, state: &mut ConnectionState, next: ConnectionState) {
        debug_assert!(
            state.can_transition_to(next),
            "illegal transition {state} -> {next}"
        );
        debug!(connection = %self.id, from = %state, to = %next, "State transition");
        *state = next;
    }

    fn initiate(self: &Arc<Self>) {
        let _dispatch = self.dispatch.lock();

        {
            let mut state = self.state.lock();
            if *state != ConnectionState::Initialization {
                trace!(connection = %self.id, state = %state, "Initiation skipped");
                return;
            }
            self.advance(&mut state, ConnectionState::Opening);
        }

        let events = TransportEvents {
            id: self.id,
            shared: Arc::downgrade(self),
        };

        if let Err(error) = self.transport.create(events) {
            debug!(connection = %self.id, %error, "Transport creation failed");
            self.handle_error(error);
        }
    }

    fn send(&self, message: Message) -> Result<()> {
        let _dispatch = self.dispatch.lock();

        if self.state() != ConnectionState::Opened {
            return Err(Error::NotOpen);
        }

        trace!(connection = %self.id, len = message.len(), "Sending message");
        if let Err(error) = self.transport.send_on_channel(message) {
            debug!(connection = %self.id, %error, "Send failed");
            self.handle_error(error);
        }

        Ok(())
    }

    fn close(&self) -> Result<()> {
        let _dispatch = self.dispatch.lock();

        let had_channel = {
            let mut state = self.state.lock();
            match *state {
                ConnectionState::Closing => return Err(Error::AlreadyClosing),
                ConnectionState::Closed => return Err(Error::AlreadyClosed),
                current => {
                    self.advance(&mut state, ConnectionState::Closing);
                    current.has_channel()
                }
            }
        };

        if had_channel {
            self.close_channel();
        }
        self.handle_close();

        Ok(())
    }

    /// Asks the transport to tear its channel down. Failures are logged only.
    fn close_channel(&self) {
        if let Err(error) = self.transport.close_channel() {
            warn!(connection = %self.id, %error, "Closing the channel failed");
        }
    }

    fn handle_open(&self) {
        let _dispatch = self.dispatch.lock();

        {
            let mut state = self.state.lock();
            if *state != ConnectionState::Opening {
                trace!(connection = %self.id, state = %state, "Open ignored");
                return;
            }
            self.advance(&mut state, ConnectionState::Opened);
        }

        self.observers.emit(&Event::Open);
    }

    fn handle_close(&self) {
        let _dispatch = self.dispatch.lock();

        {
            let mut state = self.state.lock();
            if state.is_terminal() {
                trace!(connection = %self.id, "Close ignored");
                return;
            }
            self.advance(&mut state, ConnectionState::Closed);
        }

        self.observers.emit(&Event::Close);
    }

    fn handle_error(&self, error: Error) {
        let _dispatch = self.dispatch.lock();

        let had_channel = {
            let mut state = self.state.lock();
            if state.is_closed() {
                trace!(connection = %self.id, %error, "Error ignored");
                return;
            }
            let had_channel = state.has_channel();
            self.advance(&mut state, ConnectionState::Closing);
            had_channel
        };

        if had_channel {
            self.close_channel();
        }
        self.observers.emit(&Event::Error(error));
        self.handle_close();
    }

    fn handle_message(&self, message: Message) {
        let _dispatch = self.dispatch.lock();

        let state = self.state();
        if state != ConnectionState::Opened {
            trace!(connection = %self.id, state = %state, "Message ignored");
            return;
        }

        trace!(connection = %self.id, len = message.len(), "Message received");
        self.observers.emit(&Event::Message(message));
    }
}

// ============================================================================
// Connection
// ============================================================================

/// A duplex connection with a deterministic lifecycle.
///
/// `Connection` is a cheap handle: clones share the same state, transport
/// and listeners. Dropping every handle tears the channel down without
/// emitting further events.
///
/// # Example
///
/// ```ignore
/// let connection = Connection::new(TungsteniteTransport::new("ws://127.0.0.1:9000"))?;
///
/// connection.events().on_open(|| println!("open"));
/// connection.events().on_message(|message| println!("got {message}"));
/// ```
#[derive(Clone)]
pub struct Connection {
    shared: Arc<Shared>,
}

impl Connection {
    /// Creates a connection bound to `transport`.
    ///
    /// Transport creation starts on the next scheduler tick.
    ///
    /// # Errors
    ///
    /// On native targets, returns [`Error::Unsupported`] when called outside
    /// a current-thread tokio runtime.
    pub fn new(transport: impl Transport + 'static) -> Result<Self> {
        Self::from_boxed(Box::new(transport))
    }

    /// Creates a connection bound to an already boxed transport.
    ///
    /// # Errors
    ///
    /// See [`Connection::new`].
    pub fn from_boxed(transport: Box<dyn Transport>) -> Result<Self> {
        let shared = Arc::new(Shared {
            id: ConnectionId::generate(),
            dispatch: ReentrantMutex::new(()),
            state: Mutex::new(ConnectionState::Initialization),
            transport,
            observers: Observers::new(),
        });

        let pending = Arc::downgrade(&shared);
        platform::defer(async move {
            match pending.upgrade() {
                Some(shared) => shared.initiate(),
                None => trace!("Connection dropped before initiation"),
            }
        })?;

        debug!(connection = %shared.id, "Connection created");
        Ok(Self { shared })
    }

    /// Returns the connection ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.shared.id
    }

    /// Returns the current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Returns `true` while the connection is open.
    #[inline]
    #[must_use]
    pub fn is_opened(&self) -> bool {
        self.state() == ConnectionState::Opened
    }

    /// Returns `true` once a close has started.
    ///
    /// A closing connection accepts neither sends nor another close.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state().is_closed()
    }

    /// Returns the listener registry.
    #[inline]
    #[must_use]
    pub fn events(&self) -> &Observers {
        &self.shared.observers
    }

    /// Sends `message` over the open channel.
    ///
    /// Nothing is buffered at this layer. A send the transport rejects is
    /// reported through `error` and closes the connection; it is not
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotOpen`] unless the connection is open.
    pub fn send(&self, message: impl Into<Message>) -> Result<()> {
        self.shared.send(message.into())
    }

    /// Closes the connection and emits `close`.
    ///
    /// Closing before the connection was initiated cancels transport
    /// creation.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyClosing`] if a close is in progress
    /// - [`Error::AlreadyClosed`] if the connection is closed
    pub fn close(&self) -> Result<()> {
        self.shared.close()
    }

    /// Runs `f` with no transition able to interleave.
    pub(crate) fn exclusive<R>(&self, f: impl FnOnce() -> R) -> R {
        let _dispatch = self.shared.dispatch.lock();
        f()
    }

    pub(crate) fn downgrade(&self) -> WeakConnection {
        WeakConnection {
            shared: Arc::downgrade(&self.shared),
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.shared.id)
            .field("state", &self.state())
            .field("observers", &self.shared.observers)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// WeakConnection
// ============================================================================

/// Non-owning connection handle, for listeners that refer back to their
/// own connection.
#[derive(Clone)]
pub(crate) struct WeakConnection {
    shared: Weak<Shared>,
}

impl WeakConnection {
    pub(crate) fn upgrade(&self) -> Option<Connection> {
        self.shared.upgrade().map(|shared| Connection { shared })
    }
}

// ============================================================================
// TransportEvents
// ============================================================================

/// Callback surface a [`Transport`] reports channel activity through.
///
/// Handed to [`Transport::create`]. Cloning is cheap. Once every
/// [`Connection`] handle is dropped, all callbacks become no-ops.
#[derive(Clone)]
pub struct TransportEvents {
    id: ConnectionId,
    shared: Weak<Shared>,
}

impl TransportEvents {
    /// Reports that the channel opened.
    pub fn open(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.handle_open();
        }
    }

    /// Reports that the channel closed.
    pub fn close(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.handle_close();
        }
    }

    /// Reports a channel failure.
    pub fn error(&self, error: Error) {
        if let Some(shared) = self.shared.upgrade() {
            shared.handle_error(error);
        }
    }

    /// Reports an inbound payload.
    pub fn message(&self, message: impl Into<Message>) {
        if let Some(shared) = self.shared.upgrade() {
            shared.handle_message(message.into());
        }
    }

    /// Returns `true` while the owning connection is alive.
    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.shared.strong_count() > 0
    }

    /// Returns the owning connection's ID.
    #[inline]
    #[must_use]
    pub fn connection_id(&self) -> ConnectionId {
        self.id
    }
}

impl fmt::Debug for TransportEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportEvents")
            .field("connection", &self.id)
            .field("attached", &self.is_attached())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
