//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;
use uniform_socket::{Message, Observers, Result, Transport, TransportEvents};

// ============================================================================
// Tracing
// ============================================================================

static TRACING: Once = Once::new();

/// Installs a subscriber honoring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// ScriptTransport
// ============================================================================

#[derive(Default)]
struct Script {
    events: Option<TransportEvents>,
    close_calls: usize,
    sent: Vec<Message>,
}

/// Transport driven by the test through the callbacks it was created with.
#[derive(Clone, Default)]
pub struct ScriptTransport {
    inner: Arc<Mutex<Script>>,
}

impl ScriptTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback surface, once `create` ran.
    pub fn events(&self) -> Option<TransportEvents> {
        self.inner.lock().events.clone()
    }

    pub fn created(&self) -> bool {
        self.inner.lock().events.is_some()
    }

    pub fn close_calls(&self) -> usize {
        self.inner.lock().close_calls
    }

    pub fn sent(&self) -> Vec<Message> {
        self.inner.lock().sent.clone()
    }
}

impl Transport for ScriptTransport {
    fn create(&self, events: TransportEvents) -> Result<()> {
        self.inner.lock().events = Some(events);
        Ok(())
    }

    fn close_channel(&self) -> Result<()> {
        self.inner.lock().close_calls += 1;
        Ok(())
    }

    fn send_on_channel(&self, message: Message) -> Result<()> {
        self.inner.lock().sent.push(message);
        Ok(())
    }
}

// ============================================================================
// Recorder
// ============================================================================

/// An event as seen by a listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    Open,
    Message(Message),
    Error(String),
    Close,
}

/// Collects every event emitted to an [`Observers`] registry.
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Arc<Mutex<Vec<Observed>>>,
}

impl Recorder {
    pub fn attach(observers: &Observers) -> Self {
        let recorder = Self::default();

        let seen = Arc::clone(&recorder.seen);
        observers.on_open(move || seen.lock().push(Observed::Open));

        let seen = Arc::clone(&recorder.seen);
        observers.on_message(move |message| seen.lock().push(Observed::Message(message.clone())));

        let seen = Arc::clone(&recorder.seen);
        observers.on_error(move |error| seen.lock().push(Observed::Error(error.to_string())));

        let seen = Arc::clone(&recorder.seen);
        observers.on_close(move || seen.lock().push(Observed::Close));

        recorder
    }

    pub fn seen(&self) -> Vec<Observed> {
        self.seen.lock().clone()
    }
}

// ============================================================================
// Scheduling
// ============================================================================

/// Lets spawned tasks run on a current-thread runtime.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
