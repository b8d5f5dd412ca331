//! Native backend over `tokio-tungstenite`.
//!
//! `create` spawns one tokio task per channel. The task performs the
//! handshake, then multiplexes inbound frames and outbound commands:
//!
//! - inbound text and binary frames are reported as `message`
//! - a close frame or the end of the stream is reported as `close`
//! - a handshake or stream failure is reported as `error`
//!
//! Sends and close requests reach the task over an unbounded command
//! channel, so neither primitive blocks the caller. Ping and pong frames are
//! answered by tungstenite and never surface.

// ============================================================================
// Imports
// ============================================================================

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::connection::TransportEvents;
use crate::error::{Error, Result};
use crate::protocol::{CloseCode, Message};

use super::Transport;

// ============================================================================
// ChannelCommand
// ============================================================================

/// Requests from the connection to the channel task.
enum ChannelCommand {
    /// Write a frame.
    Send(Message),
    /// Close the socket (or abort the handshake).
    Close,
}

// ============================================================================
// TungsteniteTransport
// ============================================================================

/// WebSocket client transport for native targets.
///
/// `wss://` URLs require the `native-tls` feature.
#[derive(Debug)]
pub struct TungsteniteTransport {
    url: String,
    commands: Mutex<Option<mpsc::UnboundedSender<ChannelCommand>>>,
}

impl TungsteniteTransport {
    /// Creates a transport for `url`.
    ///
    /// The URL is validated by [`Transport::create`].
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            commands: Mutex::new(None),
        }
    }

    /// Returns the target URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for TungsteniteTransport {
    fn create(&self, events: TransportEvents) -> Result<()> {
        let url = parse_url(&self.url)?;
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        *self.commands.lock() = Some(command_tx);

        debug!(connection = %events.connection_id(), %url, "Spawning channel task");
        tokio::spawn(run_channel(url, command_rx, events));

        Ok(())
    }

    fn close_channel(&self) -> Result<()> {
        if let Some(command_tx) = self.commands.lock().take() {
            // The task may already be gone after a remote close.
            let _ = command_tx.send(ChannelCommand::Close);
        }
        Ok(())
    }

    fn send_on_channel(&self, message: Message) -> Result<()> {
        let commands = self.commands.lock();
        let Some(command_tx) = commands.as_ref() else {
            return Err(Error::ConnectionClosed);
        };

        command_tx
            .send(ChannelCommand::Send(message))
            .map_err(|_| Error::ConnectionClosed)
    }
}

// ============================================================================
// Channel Task
// ============================================================================

/// Drives one socket from handshake to close.
async fn run_channel(
    url: Url,
    mut command_rx: mpsc::UnboundedReceiver<ChannelCommand>,
    events: TransportEvents,
) {
    let connection = events.connection_id();

    let handshake = connect_async(url.as_str());
    tokio::pin!(handshake);

    let ws_stream = loop {
        tokio::select! {
            result = &mut handshake => match result {
                Ok((ws_stream, response)) => {
                    debug!(%connection, status = %response.status(), "Handshake completed");
                    break ws_stream;
                }
                Err(e) => {
                    debug!(%connection, error = %e, "Handshake failed");
                    events.error(e.into());
                    return;
                }
            },

            command = command_rx.recv() => match command {
                Some(ChannelCommand::Send(_)) => {
                    warn!(%connection, "Send before open dropped");
                }
                Some(ChannelCommand::Close) | None => {
                    debug!(%connection, "Handshake aborted");
                    events.close();
                    return;
                }
            },
        }
    };

    events.open();

    let (mut ws_write, mut ws_read) = ws_stream.split();

    loop {
        tokio::select! {
            frame = ws_read.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    events.message(Message::Text(text.as_str().to_owned()));
                }

                Some(Ok(WsMessage::Binary(data))) => {
                    events.message(Message::Binary(data.to_vec()));
                }

                Some(Ok(WsMessage::Close(frame))) => {
                    match frame {
                        Some(frame) => {
                            let code = CloseCode::new(u16::from(frame.code));
                            debug!(%connection, %code, reason = frame.reason.as_str(), "Closed by remote");
                        }
                        None => debug!(%connection, "Closed by remote"),
                    }
                    events.close();
                    break;
                }

                // Ping, Pong, raw frames
                Some(Ok(_)) => {}

                Some(Err(e)) => {
                    error!(%connection, error = %e, "WebSocket error");
                    events.error(e.into());
                    break;
                }

                None => {
                    debug!(%connection, "WebSocket stream ended");
                    events.close();
                    break;
                }
            },

            command = command_rx.recv() => match command {
                Some(ChannelCommand::Send(message)) => {
                    trace!(%connection, len = message.len(), "Writing frame");
                    if let Err(e) = ws_write.send(into_frame(message)).await {
                        error!(%connection, error = %e, "Failed to write frame");
                        events.error(e.into());
                        break;
                    }
                }

                Some(ChannelCommand::Close) => {
                    if let Err(e) = ws_write.close().await {
                        debug!(%connection, error = %e, "Close handshake failed");
                    }
                    events.close();
                    break;
                }

                None => {
                    debug!(%connection, "Transport dropped");
                    let _ = ws_write.close().await;
                    break;
                }
            },
        }
    }

    debug!(%connection, "Channel task terminated");
}

// ============================================================================
// Helpers
// ============================================================================

/// Parses `raw`, accepting only `ws` and `wss`.
fn parse_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)?;

    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(Error::config(format!("Unsupported URL scheme: {other}"))),
    }
}

fn into_frame(message: Message) -> WsMessage {
    match message {
        Message::Text(text) => WsMessage::text(text),
        Message::Binary(data) => WsMessage::binary(data),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio_test::assert_ok;

    use crate::Connection;
    use crate::transport::testing::{EventLog, settle};

    #[test]
    fn test_parse_url_accepts_ws_schemes() {
        assert_ok!(parse_url("ws://127.0.0.1:9000"));
        assert_ok!(parse_url("wss://example.com/socket"));
    }

    #[test]
    fn test_parse_url_rejects_other_schemes() {
        let err = parse_url("http://example.com").unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: Unsupported URL scheme: http");

        let err = parse_url("not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_into_frame_keeps_kind() {
        assert!(into_frame(Message::from("a")).is_text());
        assert!(into_frame(Message::from(vec![1u8])).is_binary());
    }

    #[test]
    fn test_send_without_channel_fails() {
        let transport = TungsteniteTransport::new("ws://127.0.0.1:9");
        assert_eq!(transport.url(), "ws://127.0.0.1:9");
        assert!(matches!(
            transport.send_on_channel(Message::from("x")),
            Err(Error::ConnectionClosed)
        ));
        assert_ok!(transport.close_channel());
    }

    #[tokio::test]
    async fn test_invalid_url_reports_error_then_close() {
        let connection =
            assert_ok!(Connection::new(TungsteniteTransport::new("ftp://example.com")));
        let log = EventLog::attach(connection.events());

        settle().await;

        assert_eq!(
            log.entries(),
            vec![
                "error:Configuration error: Unsupported URL scheme: ftp",
                "close",
            ]
        );
    }
}
