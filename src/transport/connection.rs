//! Per-connection WebSocket event loop.
//!
//! Each accepted socket gets one task running [`Connection::run`]. The loop
//! selects over:
//!
//! - Incoming frames, handed to the router in arrival order
//! - The peer's outbound queue, written to the socket
//! - The server's shutdown signal
//!
//! When the loop ends for any reason the session is closed, which clears
//! its registry entries.

// ============================================================================
// Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace, warn};

use crate::protocol::Inbound;
use crate::relay::{MessageRouter, Peer};

// ============================================================================
// Connection
// ============================================================================

/// An accepted WebSocket connection and its event loop.
pub(crate) struct Connection {
    ws_stream: WebSocketStream<TcpStream>,
    addr: SocketAddr,
}

impl Connection {
    /// Wraps an upgraded WebSocket stream.
    pub(crate) fn new(ws_stream: WebSocketStream<TcpStream>, addr: SocketAddr) -> Self {
        Self { ws_stream, addr }
    }

    /// Runs the event loop until the socket closes or shutdown is signalled.
    pub(crate) async fn run(self, router: Arc<MessageRouter>, mut shutdown_rx: watch::Receiver<bool>) {
        let Self { ws_stream, addr } = self;
        let (mut ws_write, mut ws_read) = ws_stream.split();

        // Subscribed after the signal was sent: `changed()` would never fire.
        if *shutdown_rx.borrow_and_update() {
            debug!(?addr, "Relay already shutting down");
            let _ = ws_write.close().await;
            return;
        }

        let (peer, mut outbound_rx) = Peer::channel();
        let mut session = router.lifecycle().open(peer);
        debug!(conn_id = %session.id(), ?addr, "Event loop started");

        loop {
            tokio::select! {
                // Incoming frames from host or viewer
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Close(_))) => {
                            debug!(conn_id = %session.id(), "WebSocket closed by remote");
                            break;
                        }

                        Some(Ok(message)) => {
                            if let Some(inbound) = Inbound::from_message(message) {
                                let dispatch = router.handle_message(&mut session, inbound);
                                trace!(conn_id = %session.id(), ?dispatch, "Message handled");
                            }
                        }

                        Some(Err(e)) => {
                            debug!(conn_id = %session.id(), error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!(conn_id = %session.id(), "WebSocket stream ended");
                            break;
                        }
                    }
                }

                // Messages queued by the router
                outbound = outbound_rx.recv() => {
                    let Some(message) = outbound else {
                        break;
                    };

                    if let Err(e) = ws_write.send(message).await {
                        warn!(conn_id = %session.id(), error = %e, "Failed to write to WebSocket");
                        break;
                    }
                }

                // Relay shutting down
                _ = shutdown_rx.changed() => {
                    debug!(conn_id = %session.id(), "Shutdown signal received");
                    let _ = ws_write.close().await;
                    break;
                }
            }
        }

        router.lifecycle().close(session);
        debug!(?addr, "Event loop terminated");
    }
}

// ============================================================================
// Tests
// ============================================================================
