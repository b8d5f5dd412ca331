//! In-memory transport for unit tests.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;

use crate::connection::{Observers, TransportEvents};
use crate::error::{Error, Result};
use crate::protocol::Message;

use super::Transport;

// ============================================================================
// RecordingTransport
// ============================================================================

/// Primitive invoked on a [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Create,
    CloseChannel,
    Send(Message),
}

#[derive(Default)]
struct Recording {
    calls: Vec<Call>,
    events: Option<TransportEvents>,
    fail_create: bool,
    fail_close: bool,
    fail_send: Option<Message>,
}

/// Transport that records every primitive and lets the test drive callbacks.
#[derive(Clone, Default)]
pub(crate) struct RecordingTransport {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Transport whose `create` fails with "refused".
    pub(crate) fn failing() -> Self {
        let transport = Self::new();
        transport.inner.lock().fail_create = true;
        transport
    }

    pub(crate) fn with_failing_close(self) -> Self {
        self.inner.lock().fail_close = true;
        self
    }

    pub(crate) fn with_failing_send(self, message: impl Into<Message>) -> Self {
        self.inner.lock().fail_send = Some(message.into());
        self
    }

    pub(crate) fn created(&self) -> bool {
        self.inner.lock().calls.contains(&Call::Create)
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.inner.lock().calls.clone()
    }

    pub(crate) fn sent(&self) -> Vec<Message> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Send(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Callback surface received in `create`.
    pub(crate) fn events(&self) -> TransportEvents {
        self.inner
            .lock()
            .events
            .clone()
            .expect("transport was not created")
    }
}

impl Transport for RecordingTransport {
    fn create(&self, events: TransportEvents) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.calls.push(Call::Create);
        inner.events = Some(events);

        if inner.fail_create {
            return Err(Error::connection("refused"));
        }
        Ok(())
    }

    fn close_channel(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.calls.push(Call::CloseChannel);

        if inner.fail_close {
            return Err(Error::connection("close failed"));
        }
        Ok(())
    }

    fn send_on_channel(&self, message: Message) -> Result<()> {
        let mut inner = self.inner.lock();

        if inner.fail_send.as_ref() == Some(&message) {
            return Err(Error::connection("send failed"));
        }
        inner.calls.push(Call::Send(message));
        Ok(())
    }
}

// ============================================================================
// EventLog
// ============================================================================

/// Records emitted events as `"open"`, `"message:<payload>"`,
/// `"error:<display>"` and `"close"`.
#[derive(Clone, Default)]
pub(crate) struct EventLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub(crate) fn attach(observers: &Observers) -> Self {
        let log = Self::default();

        let entries = Arc::clone(&log.entries);
        observers.on_open(move || entries.lock().push("open".to_string()));

        let entries = Arc::clone(&log.entries);
        observers.on_message(move |message| entries.lock().push(format!("message:{message}")));

        let entries = Arc::clone(&log.entries);
        observers.on_error(move |error| entries.lock().push(format!("error:{error}")));

        let entries = Arc::clone(&log.entries);
        observers.on_close(move || entries.lock().push("close".to_string()));

        log
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

// ============================================================================
// Scheduling
// ============================================================================

/// Lets deferred initiation run on the current-thread test runtime.
pub(crate) async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
