//! Handle to one live connection.
//!
//! A [`Peer`] pairs a [`ConnectionId`] with the sending half of that
//! connection's outbound queue. The queue is drained by the connection's own
//! event loop, so sending never waits on the network.
//!
//! The queue holds at most [`OUTBOUND_CAPACITY`] messages. When a peer's socket
//! falls behind, further sends to it fail with [`Error::QueueFull`] and the
//! message is dropped for that peer only.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_tungstenite::tungstenite::Message;

use crate::error::{Error, Result};
use crate::identifiers::ConnectionId;
use crate::protocol::RelayMessage;

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of messages waiting to be written to one peer's socket.
pub const OUTBOUND_CAPACITY: usize = 32;

// ============================================================================
// Types
// ============================================================================

/// Receiving half of a peer's outbound queue.
pub type OutboundRx = mpsc::Receiver<Message>;

// ============================================================================
// Peer
// ============================================================================

/// Cloneable, comparable handle to a connection.
///
/// Equality is identity: two handles are equal if they were created for the
/// same connection.
#[derive(Clone)]
pub struct Peer {
    /// Relay-assigned identity.
    id: ConnectionId,
    /// Outbound queue, drained by the connection's event loop.
    outbound: mpsc::Sender<Message>,
}

impl Peer {
    /// Creates a handle for connection `id` writing into `outbound`.
    #[inline]
    #[must_use]
    pub fn new(id: ConnectionId, outbound: mpsc::Sender<Message>) -> Self {
        Self { id, outbound }
    }

    /// Creates a handle with a fresh id and its outbound queue.
    #[must_use]
    pub fn channel() -> (Self, OutboundRx) {
        let (tx, rx) = mpsc::channel(OUTBOUND_CAPACITY);
        (Self::new(ConnectionId::generate(), tx), rx)
    }

    /// Returns the connection id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns `true` once the connection's event loop has ended.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }

    /// Queues a raw WebSocket message without waiting.
    ///
    /// # Errors
    ///
    /// - [`Error::QueueFull`] if the peer has [`OUTBOUND_CAPACITY`] messages
    ///   not yet written; `message` is dropped
    /// - [`Error::ConnectionClosed`] if the connection is gone
    pub fn send(&self, message: Message) -> Result<()> {
        self.outbound.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => Error::queue_full(self.id),
            TrySendError::Closed(_) => Error::ConnectionClosed,
        })
    }

    /// Queues a JSON envelope as a text frame.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if serialization fails
    /// - [`Error::QueueFull`] or [`Error::ConnectionClosed`] as for [`Peer::send`]
    pub fn send_json(&self, message: &RelayMessage) -> Result<()> {
        self.send(message.to_message()?)
    }

    /// Queues a binary frame.
    ///
    /// # Errors
    ///
    /// Same as [`Peer::send`].
    #[inline]
    pub fn send_binary(&self, data: Bytes) -> Result<()> {
        self.send(Message::Binary(data))
    }
}

impl PartialEq for Peer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Peer {}

impl fmt::Debug for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Peer")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_json_queues_text() {
        let (peer, mut rx) = Peer::channel();
        peer.send_json(&RelayMessage::Connected).expect("send");

        let message = rx.try_recv().expect("queued");
        assert_eq!(message.to_text().expect("text"), r#"{"type":"connected"}"#);
    }

    #[test]
    fn test_send_binary_is_verbatim() {
        let (peer, mut rx) = Peer::channel();
        peer.send_binary(Bytes::from_static(b"\xff\xd8jpeg"))
            .expect("send");

        assert_eq!(
            rx.try_recv().expect("queued"),
            Message::Binary(Bytes::from_static(b"\xff\xd8jpeg"))
        );
    }

    #[test]
    fn test_send_to_closed_peer_fails() {
        let (peer, rx) = Peer::channel();
        drop(rx);

        assert!(peer.is_closed());
        assert!(matches!(
            peer.send(Message::text("x")),
            Err(Error::ConnectionClosed)
        ));
    }

    #[test]
    fn test_send_to_full_queue_drops_message() {
        let (peer, mut rx) = Peer::channel();
        for i in 0..OUTBOUND_CAPACITY {
            peer.send(Message::text(i.to_string())).expect("within capacity");
        }

        let err = peer.send(Message::text("overflow")).unwrap_err();
        assert!(matches!(err, Error::QueueFull { conn_id } if conn_id == peer.id()));
        assert!(!peer.is_closed());

        // Draining one slot makes room again.
        assert_eq!(rx.try_recv().expect("queued"), Message::text("0"));
        peer.send(Message::text("next")).expect("room after drain");
    }

    #[test]
    fn test_equality_is_identity() {
        let (a, _rx_a) = Peer::channel();
        let (b, _rx_b) = Peer::channel();

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
