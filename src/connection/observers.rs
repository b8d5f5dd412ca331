//! Listener registry for connection events.
//!
//! Listeners for one event fire in registration order. Emission works on a
//! snapshot of the registered listeners, so a listener may register or
//! unregister listeners (itself included) while an event is being
//! delivered:
//!
//! - a listener removed mid-emission still receives the in-flight event
//! - a listener added mid-emission first receives the next event
//! - a `once` listener is unregistered before it runs
//!
//! The crate itself attaches internal hooks (the send queue's replay, for
//! one). Hooks run after the public listeners, fire once, are dropped
//! when `close` is emitted, and are invisible to [`Observers::off`],
//! [`Observers::off_all`] and [`Observers::listener_count`].

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::Error;
use crate::identifiers::ListenerId;
use crate::platform::MaybeSendSync;
use crate::protocol::{Event, EventKind, Message};

// ============================================================================
// Types
// ============================================================================

/// Shared listener callback.
#[cfg(not(target_arch = "wasm32"))]
pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// Shared listener callback.
#[cfg(target_arch = "wasm32")]
pub type Listener = Arc<dyn Fn(&Event)>;

struct Registration {
    id: ListenerId,
    once: bool,
    listener: Listener,
}

// ============================================================================
// Observers
// ============================================================================

/// Per-event listener lists of one connection.
pub struct Observers {
    next_id: AtomicU64,
    registrations: Mutex<FxHashMap<EventKind, Vec<Registration>>>,
    hooks: Mutex<FxHashMap<EventKind, Vec<Listener>>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            registrations: Mutex::new(FxHashMap::default()),
            hooks: Mutex::new(FxHashMap::default()),
        }
    }

    /// Attaches an internal hook for the next `kind` event.
    pub(crate) fn hook<F>(&self, kind: EventKind, hook: F)
    where
        F: Fn(&Event) + MaybeSendSync + 'static,
    {
        self.hooks.lock().entry(kind).or_default().push(Arc::new(hook));
    }

    /// Returns the number of internal hooks waiting for `kind`.
    #[cfg(test)]
    pub(crate) fn hook_count(&self, kind: EventKind) -> usize {
        self.hooks.lock().get(&kind).map_or(0, Vec::len)
    }

    /// Registers `listener` for every `kind` event.
    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&Event) + MaybeSendSync + 'static,
    {
        self.register(kind, false, Arc::new(listener))
    }

    /// Registers `listener` for the next `kind` event only.
    pub fn once<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&Event) + MaybeSendSync + 'static,
    {
        self.register(kind, true, Arc::new(listener))
    }

    /// Registers a listener for `open`.
    pub fn on_open<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + MaybeSendSync + 'static,
    {
        self.on(EventKind::Open, move |_| listener())
    }

    /// Registers a listener for `message`.
    pub fn on_message<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Message) + MaybeSendSync + 'static,
    {
        self.on(EventKind::Message, move |event| {
            if let Some(message) = event.message() {
                listener(message);
            }
        })
    }

    /// Registers a listener for `error`.
    pub fn on_error<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Error) + MaybeSendSync + 'static,
    {
        self.on(EventKind::Error, move |event| {
            if let Some(error) = event.error() {
                listener(error);
            }
        })
    }

    /// Registers a listener for `close`.
    pub fn on_close<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + MaybeSendSync + 'static,
    {
        self.on(EventKind::Close, move |_| listener())
    }

    /// Unregisters a listener.
    ///
    /// Returns `false` if `id` was not registered (or a `once` listener
    /// already fired).
    pub fn off(&self, id: ListenerId) -> bool {
        let mut registrations = self.registrations.lock();

        for listeners in registrations.values_mut() {
            if let Some(index) = listeners.iter().position(|r| r.id == id) {
                listeners.remove(index);
                return true;
            }
        }

        false
    }

    /// Unregisters every listener for `kind`.
    pub fn off_all(&self, kind: EventKind) {
        self.registrations.lock().remove(&kind);
    }

    /// Returns the number of listeners registered for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.registrations
            .lock()
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Delivers `event` to its listeners, then its hooks, and returns how
    /// many listeners ran.
    pub(crate) fn emit(&self, event: &Event) -> usize {
        let hooks = {
            let mut hooks = self.hooks.lock();
            let fired = hooks.remove(&event.kind()).unwrap_or_default();
            // Nothing follows close.
            if event.kind() == EventKind::Close {
                hooks.clear();
            }
            fired
        };

        let snapshot: Vec<Listener> = {
            let mut registrations = self.registrations.lock();
            match registrations.get_mut(&event.kind()) {
                Some(listeners) => {
                    let snapshot = listeners
                        .iter()
                        .map(|r| Arc::clone(&r.listener))
                        .collect();
                    listeners.retain(|r| !r.once);
                    snapshot
                }
                None => Vec::new(),
            }
        };

        for listener in &snapshot {
            listener(event);
        }
        for hook in &hooks {
            hook(event);
        }

        snapshot.len()
    }

    fn register(&self, kind: EventKind, once: bool, listener: Listener) -> ListenerId {
        let id = ListenerId::new(self.next_id.fetch_add(1, Ordering::Relaxed));

        self.registrations
            .lock()
            .entry(kind)
            .or_default()
            .push(Registration { id, once, listener });

        id
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registrations = self.registrations.lock();
        let mut map = f.debug_map();
        for kind in EventKind::ALL {
            map.entry(&kind, &registrations.get(&kind).map_or(0, Vec::len));
        }
        map.finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
