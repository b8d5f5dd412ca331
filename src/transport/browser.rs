//! Browser backend over `web_sys::WebSocket`.
//!
//! Binary frames are received as `ArrayBuffer` and surface as
//! [`Message::Binary`]. The browser `error` event carries no detail, so it
//! is only recorded; the `close` event that always follows reports it as
//! [`Error::AbnormalClosure`] with the platform close code.

// ============================================================================
// Imports
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use js_sys::{ArrayBuffer, Reflect, Uint8Array};
use tracing::{debug, trace, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{BinaryType, CloseEvent, Event, MessageEvent, WebSocket};

use crate::connection::TransportEvents;
use crate::error::{Error, Result};
use crate::platform;
use crate::protocol::{CloseCode, Message};

use super::Transport;

// ============================================================================
// BrowserChannel
// ============================================================================

/// A live socket and the handlers attached to it.
struct BrowserChannel {
    socket: WebSocket,
    _on_open: Closure<dyn FnMut(Event)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut(Event)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
}

impl BrowserChannel {
    fn is_live(&self) -> bool {
        matches!(
            self.socket.ready_state(),
            WebSocket::CONNECTING | WebSocket::OPEN
        )
    }
}

impl Drop for BrowserChannel {
    fn drop(&mut self) {
        self.socket.set_onopen(None);
        self.socket.set_onmessage(None);
        self.socket.set_onerror(None);
        self.socket.set_onclose(None);

        if self.is_live() {
            let _ = self.socket.close();
        }
    }
}

// ============================================================================
// BrowserTransport
// ============================================================================

/// WebSocket transport for `wasm32` targets running in a browser or worker.
pub struct BrowserTransport {
    url: String,
    channel: RefCell<Option<BrowserChannel>>,
}

impl BrowserTransport {
    /// Creates a transport for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            channel: RefCell::new(None),
        }
    }

    /// Returns the target URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Debug for BrowserTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserTransport")
            .field("url", &self.url)
            .field("live", &self.channel.borrow().as_ref().is_some_and(BrowserChannel::is_live))
            .finish()
    }
}

impl Transport for BrowserTransport {
    fn create(&self, events: TransportEvents) -> Result<()> {
        let available = Reflect::has(&js_sys::global(), &JsValue::from_str("WebSocket"))
            .unwrap_or(false);
        if !available {
            return Err(Error::unsupported("WebSocket is not available in this environment"));
        }

        let socket = WebSocket::new(&self.url).map_err(|e| Error::connection(describe(&e)))?;
        socket.set_binary_type(BinaryType::Arraybuffer);

        let connection = events.connection_id();
        let errored = Rc::new(Cell::new(false));

        let on_open = {
            let events = events.clone();
            Closure::<dyn FnMut(Event)>::new(move |_: Event| events.open())
        };

        let on_message = {
            let events = events.clone();
            Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
                let data = event.data();
                if let Some(text) = data.as_string() {
                    events.message(Message::Text(text));
                } else if let Ok(buffer) = data.dyn_into::<ArrayBuffer>() {
                    events.message(Message::Binary(Uint8Array::new(&buffer).to_vec()));
                } else {
                    warn!(%connection, "Unsupported message payload ignored");
                }
            })
        };

        let on_error = {
            let errored = Rc::clone(&errored);
            Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                debug!(%connection, "Socket error, waiting for close");
                errored.set(true);
            })
        };

        let on_close = Closure::<dyn FnMut(CloseEvent)>::new(move |event: CloseEvent| {
            let code = CloseCode::new(event.code());
            trace!(%connection, %code, clean = event.was_clean(), "Socket closed");

            if errored.get() || !event.was_clean() {
                events.error(Error::abnormal_closure(code, event.reason()));
            } else {
                events.close();
            }
        });

        socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        *self.channel.borrow_mut() = Some(BrowserChannel {
            socket,
            _on_open: on_open,
            _on_message: on_message,
            _on_error: on_error,
            _on_close: on_close,
        });

        Ok(())
    }

    fn close_channel(&self) -> Result<()> {
        let Some(channel) = self.channel.borrow_mut().take() else {
            return Ok(());
        };

        let result = if channel.is_live() {
            channel.socket.close().map_err(|e| Error::connection(describe(&e)))
        } else {
            Ok(())
        };

        // May run inside one of the channel's own handlers.
        platform::defer(async move { drop(channel) });

        result
    }

    fn send_on_channel(&self, message: Message) -> Result<()> {
        let channel = self.channel.borrow();
        let Some(channel) = channel.as_ref() else {
            return Err(Error::ConnectionClosed);
        };

        match message {
            Message::Text(text) => channel.socket.send_with_str(&text),
            Message::Binary(data) => channel.socket.send_with_u8_array(&data),
        }
        .map_err(|e| Error::connection(describe(&e)))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
