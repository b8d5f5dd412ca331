//! The socket factory.
//!
//! [`Socket::connect`] picks the backend, binds a [`Connection`] to it and
//! wraps that in a [`SendQueue`] when asked to. The result exposes one
//! surface regardless of the combination.

// ============================================================================
// Imports
// ============================================================================

use tracing::debug;

use crate::connection::{Connection, ConnectionState, Observers, SendQueue};
use crate::error::Result;
use crate::identifiers::ConnectionId;
use crate::protocol::Message;
use crate::transport::Transport;

use super::builder::SocketBuilder;
use super::options::SocketOptions;

// ============================================================================
// Socket
// ============================================================================

/// A connection as returned by the factory.
///
/// # Example
///
/// ```ignore
/// use uniform_socket::{Socket, SocketOptions};
///
/// let socket = Socket::connect(SocketOptions::new("ws://127.0.0.1:9000"))?;
///
/// socket.events().on_open(|| println!("open"));
/// socket.events().on_message(|message| println!("{message}"));
/// socket.events().on_close(|| println!("closed"));
/// ```
#[derive(Debug, Clone)]
pub enum Socket {
    /// Sends fail until the connection opens.
    Direct(Connection),
    /// Sends are buffered until the connection opens.
    Queued(SendQueue),
}

// ============================================================================
// Constructors
// ============================================================================

impl Socket {
    /// Creates a builder for `url`.
    #[inline]
    #[must_use]
    pub fn builder(url: impl Into<String>) -> SocketBuilder {
        SocketBuilder::new(url)
    }

    /// Creates a socket from `options`.
    ///
    /// Connecting starts on the next scheduler tick; failures to reach the
    /// endpoint arrive as `error` then `close` events.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`](crate::Error::Config) if the options are invalid
    /// - [`Error::Unsupported`](crate::Error::Unsupported) on native targets
    ///   when called outside a current-thread tokio runtime
    pub fn connect(options: SocketOptions) -> Result<Self> {
        options.validate()?;

        let backend = options.resolved_backend();
        let connection = Connection::from_boxed(backend.into_transport(&options.url))?;

        debug!(
            connection = %connection.id(),
            %backend,
            send_queue = options.send_queue,
            "Socket created"
        );

        Ok(Self::wrap(connection, options.send_queue))
    }

    /// Creates a socket over a caller-supplied transport.
    ///
    /// # Errors
    ///
    /// See [`Connection::new`].
    pub fn connect_with(transport: impl Transport + 'static, send_queue: bool) -> Result<Self> {
        Ok(Self::wrap(Connection::new(transport)?, send_queue))
    }

    fn wrap(connection: Connection, send_queue: bool) -> Self {
        if send_queue {
            Self::Queued(SendQueue::new(connection))
        } else {
            Self::Direct(connection)
        }
    }
}

// ============================================================================
// Operations
// ============================================================================

impl Socket {
    /// Sends `message`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotOpen`](crate::Error::NotOpen) if not open and the
    /// send queue is disabled. Transport failures arrive as `error` events.
    pub fn send(&self, message: impl Into<Message>) -> Result<()> {
        match self {
            Self::Direct(connection) => connection.send(message),
            Self::Queued(queue) => queue.send(message),
        }
    }

    /// Closes the socket.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyClosing`](crate::Error::AlreadyClosing) if a close is
    ///   in progress
    /// - [`Error::AlreadyClosed`](crate::Error::AlreadyClosed) if closed
    #[inline]
    pub fn close(&self) -> Result<()> {
        self.connection().close()
    }

    /// Returns `true` while the socket is open.
    #[inline]
    #[must_use]
    pub fn is_opened(&self) -> bool {
        self.connection().is_opened()
    }

    /// Returns `true` once a close has started.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.connection().is_closed()
    }

    /// Returns the lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.connection().state()
    }

    /// Returns the connection ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.connection().id()
    }

    /// Returns the listener registry.
    #[inline]
    #[must_use]
    pub fn events(&self) -> &Observers {
        self.connection().events()
    }

    /// Returns the underlying connection.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &Connection {
        match self {
            Self::Direct(connection) => connection,
            Self::Queued(queue) => queue.connection(),
        }
    }

    /// Returns `true` if sends are buffered until open.
    #[inline]
    #[must_use]
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
