//! Send-buffering decorator.
//!
//! [`SendQueue`] wraps a [`Connection`] and changes only how `send` behaves:
//!
//! | Connection | `send` |
//! |------------|--------|
//! | never opened | appended to the backlog |
//! | `open` emitted | backlog replayed in order, then passed through |
//! | `close` emitted | silently discarded |
//!
//! Messages submitted while the backlog is being replayed are appended
//! behind it, so submission order is always delivery order.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::identifiers::ConnectionId;
use crate::protocol::{EventKind, Message};

use super::core::Connection;
use super::observers::Observers;
use super::state::ConnectionState;

// ============================================================================
// QueueMode
// ============================================================================

enum QueueMode {
    /// Not yet open.
    Buffering(Vec<Message>),
    /// Open observed; the backlog is being replayed.
    Flushing(Vec<Message>),
    /// Replay finished.
    Direct,
    /// Closed.
    Discarding,
}

impl QueueMode {
    fn for_state(state: ConnectionState) -> Self {
        match state {
            ConnectionState::Opened => Self::Direct,
            state if state.is_closed() => Self::Discarding,
            _ => Self::Buffering(Vec::new()),
        }
    }

    fn pending(&self) -> usize {
        match self {
            Self::Buffering(backlog) | Self::Flushing(backlog) => backlog.len(),
            Self::Direct | Self::Discarding => 0,
        }
    }

    const fn name(&self) -> &'static str {
        match self {
            Self::Buffering(_) => "buffering",
            Self::Flushing(_) => "flushing",
            Self::Direct => "direct",
            Self::Discarding => "discarding",
        }
    }
}

// ============================================================================
// SendQueue
// ============================================================================

/// A [`Connection`] whose sends are held back until it opens.
///
/// Everything except [`send`](Self::send) delegates to the wrapped
/// connection unchanged.
#[derive(Clone)]
pub struct SendQueue {
    connection: Connection,
    queue: Arc<Mutex<QueueMode>>,
}

impl SendQueue {
    /// Wraps `connection`.
    ///
    /// A connection that is already open is passed through directly; one
    /// that is closing or closed discards every send.
    pub fn new(connection: Connection) -> Self {
        let queue = connection.exclusive(|| {
            let mode = QueueMode::for_state(connection.state());
            let buffering = matches!(mode, QueueMode::Buffering(_));
            let queue = Arc::new(Mutex::new(mode));

            if buffering {
                let weak = connection.downgrade();
                let pending = Arc::clone(&queue);
                connection.events().hook(EventKind::Open, move |_| {
                    if let Some(connection) = weak.upgrade() {
                        flush(&connection, &pending);
                    }
                });

                let pending = Arc::clone(&queue);
                let id = connection.id();
                connection.events().hook(EventKind::Close, move |_| {
                    let dropped = mem::replace(&mut *pending.lock(), QueueMode::Discarding).pending();
                    debug!(connection = %id, dropped, "Send queue discarding");
                });
            }

            queue
        });

        Self { connection, queue }
    }

    /// Sends `message`, buffering it until the connection opens.
    ///
    /// Never fails before `open` or after `close`. A pass-through send the
    /// transport rejects closes the connection through `error`.
    ///
    /// # Errors
    ///
    /// See [`Connection::send`].
    pub fn send(&self, message: impl Into<Message>) -> Result<()> {
        let message = message.into();

        self.connection.exclusive(|| {
            {
                let mut mode = self.queue.lock();
                match &mut *mode {
                    QueueMode::Buffering(backlog) | QueueMode::Flushing(backlog) => {
                        backlog.push(message);
                        trace!(
                            connection = %self.connection.id(),
                            pending = backlog.len(),
                            "Message queued"
                        );
                        return Ok(());
                    }
                    QueueMode::Discarding => {
                        trace!(connection = %self.connection.id(), "Message discarded");
                        return Ok(());
                    }
                    QueueMode::Direct => {}
                }
            }

            if self.connection.is_closed() {
                trace!(connection = %self.connection.id(), "Message discarded");
                return Ok(());
            }

            self.connection.send(message)
        })
    }

    /// Closes the wrapped connection.
    ///
    /// # Errors
    ///
    /// See [`Connection::close`].
    #[inline]
    pub fn close(&self) -> Result<()> {
        self.connection.close()
    }

    /// Returns the number of messages waiting for `open`.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.lock().pending()
    }

    /// Returns `true` while the wrapped connection is open.
    #[inline]
    #[must_use]
    pub fn is_opened(&self) -> bool {
        self.connection.is_opened()
    }

    /// Returns `true` once the wrapped connection started closing.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.connection.is_closed()
    }

    /// Returns the wrapped connection's state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Returns the wrapped connection's ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.connection.id()
    }

    /// Returns the wrapped connection's listener registry.
    #[inline]
    #[must_use]
    pub fn events(&self) -> &Observers {
        self.connection.events()
    }

    /// Returns the wrapped connection.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

impl fmt::Debug for SendQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = self.queue.lock();
        f.debug_struct("SendQueue")
            .field("connection", &self.connection)
            .field("mode", &mode.name())
            .field("pending", &mode.pending())
            .finish()
    }
}

// ============================================================================
// Replay
// ============================================================================

/// Replays the backlog, then switches to pass-through.
///
/// Runs inside the `open` emission, after the public listeners. Messages
/// queued while a batch is being sent form the next batch. A send that
/// closes the connection drops the rest of the backlog.
fn flush(connection: &Connection, queue: &Mutex<QueueMode>) {
    let id = connection.id();
    let mut replayed = 0usize;

    loop {
        let batch = {
            let mut mode = queue.lock();
            match mem::replace(&mut *mode, QueueMode::Direct) {
                QueueMode::Buffering(backlog) | QueueMode::Flushing(backlog)
                    if !backlog.is_empty() =>
                {
                    *mode = QueueMode::Flushing(Vec::new());
                    backlog
                }
                QueueMode::Discarding => {
                    *mode = QueueMode::Discarding;
                    return;
                }
                QueueMode::Buffering(_) | QueueMode::Flushing(_) | QueueMode::Direct => break,
            }
        };

        for message in batch {
            if let Err(error) = connection.send(message) {
                warn!(connection = %id, %error, "Replaying queued message failed");
            }
            if connection.is_closed() {
                *queue.lock() = QueueMode::Discarding;
                debug!(connection = %id, replayed, "Replay cut short by close");
                return;
            }
            replayed += 1;
        }
    }

    debug!(connection = %id, replayed, "Send queue flushed");
}

// ============================================================================
// Tests
// ============================================================================
