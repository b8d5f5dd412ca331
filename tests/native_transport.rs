//! End-to-end tests of the native backend against a local server.

#![cfg(not(target_arch = "wasm32"))]

mod common;

use std::time::Duration;

use common::{Observed, init_tracing};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use uniform_socket::{ConnectionState, Error, Message, Socket};

// ============================================================================
// Constants
// ============================================================================

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Servers
// ============================================================================

/// Echoes every data frame back; returns the `ws://` URL.
async fn echo_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else {
                    return;
                };
                while let Some(Ok(frame)) = ws.next().await {
                    match frame {
                        WsMessage::Text(_) | WsMessage::Binary(_) => {
                            if ws.send(frame).await.is_err() {
                                break;
                            }
                        }
                        WsMessage::Close(_) => break,
                        _ => {}
                    }
                }
            });
        }
    });

    format!("ws://{addr}")
}

/// Completes the handshake, then closes cleanly.
async fn closing_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await
            && let Ok(mut ws) = accept_async(stream).await
        {
            let _ = ws.close(None).await;
            while ws.next().await.is_some() {}
        }
    });

    format!("ws://{addr}")
}

/// A URL nothing listens on.
async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("ws://{addr}")
}

// ============================================================================
// Helpers
// ============================================================================

/// Forwards every event of `socket` into a channel.
fn observe(socket: &Socket) -> mpsc::UnboundedReceiver<Observed> {
    let (tx, rx) = mpsc::unbounded_channel();

    let events = socket.events();
    let sender = tx.clone();
    events.on_open(move || {
        let _ = sender.send(Observed::Open);
    });
    let sender = tx.clone();
    events.on_message(move |message| {
        let _ = sender.send(Observed::Message(message.clone()));
    });
    let sender = tx.clone();
    events.on_error(move |error| {
        let _ = sender.send(Observed::Error(error.to_string()));
    });
    events.on_close(move || {
        let _ = tx.send(Observed::Close);
    });

    rx
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Observed>) -> Observed {
    timeout(EVENT_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event channel closed")
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_echo_text_and_binary() {
    init_tracing();
    let socket = Socket::builder(echo_server().await).connect().expect("socket");
    let mut rx = observe(&socket);

    assert_eq!(next(&mut rx).await, Observed::Open);
    assert!(socket.is_opened());

    socket.send("hello").expect("send text");
    socket.send(vec![0u8, 1, 2]).expect("send binary");

    assert_eq!(next(&mut rx).await, Observed::Message(Message::from("hello")));
    assert_eq!(
        next(&mut rx).await,
        Observed::Message(Message::from(vec![0u8, 1, 2]))
    );

    socket.close().expect("close");
    assert_eq!(next(&mut rx).await, Observed::Close);
    assert_eq!(socket.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn test_queued_sends_arrive_in_order() {
    init_tracing();
    let socket = Socket::builder(echo_server().await)
        .send_queue(true)
        .connect()
        .expect("socket");
    let mut rx = observe(&socket);

    for text in ["a", "b", "c"] {
        socket.send(text).expect("queued send");
    }

    assert_eq!(next(&mut rx).await, Observed::Open);
    socket.send("d").expect("send after open");

    for text in ["a", "b", "c", "d"] {
        assert_eq!(next(&mut rx).await, Observed::Message(Message::from(text)));
    }

    socket.close().expect("close");
    assert_eq!(next(&mut rx).await, Observed::Close);
}

#[tokio::test]
async fn test_direct_send_before_open_fails() {
    init_tracing();
    let socket = Socket::builder(echo_server().await).connect().expect("socket");

    let err = socket.send("early").unwrap_err();
    assert!(err.is_usage_error());

    socket.close().expect("close");
}

#[tokio::test]
async fn test_refused_connection_reports_error_then_close() {
    init_tracing();
    let socket = Socket::builder(refused_url().await).connect().expect("socket");
    let mut rx = observe(&socket);

    assert!(matches!(next(&mut rx).await, Observed::Error(_)));
    assert_eq!(next(&mut rx).await, Observed::Close);
    assert!(socket.is_closed());
}

#[tokio::test]
async fn test_invalid_scheme_reports_error_then_close() {
    init_tracing();
    let socket = Socket::builder("http://127.0.0.1:1").connect().expect("socket");
    let mut rx = observe(&socket);

    match next(&mut rx).await {
        Observed::Error(message) => assert!(message.contains("Unsupported URL scheme")),
        other => panic!("expected error, got {other:?}"),
    }
    assert_eq!(next(&mut rx).await, Observed::Close);
}

#[tokio::test]
async fn test_remote_close_is_clean() {
    init_tracing();
    let socket = Socket::builder(closing_server().await).connect().expect("socket");
    let mut rx = observe(&socket);

    assert_eq!(next(&mut rx).await, Observed::Open);
    assert_eq!(next(&mut rx).await, Observed::Close);

    let err = socket.close().unwrap_err();
    assert!(err.is_usage_error());
}

#[tokio::test]
async fn test_close_before_tick_never_connects() {
    init_tracing();
    let socket = Socket::builder(echo_server().await).connect().expect("socket");
    let mut rx = observe(&socket);

    socket.close().expect("close");

    assert_eq!(next(&mut rx).await, Observed::Close);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_multi_thread_runtime_is_refused() {
    init_tracing();
    let url = echo_server().await;

    let err = Socket::builder(url).connect().unwrap_err();
    assert!(matches!(err, Error::Unsupported { .. }));
}
