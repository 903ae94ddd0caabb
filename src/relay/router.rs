//! Message routing.
//!
//! [`MessageRouter::handle_message`] is the single entry point the transport
//! calls for every text or binary frame a connection delivers.
//!
//! # Routing Rules
//!
//! | Inbound | Action |
//! |---------|--------|
//! | `register_host {id}` | Register sender as host `id`, no reply |
//! | `connect_client {hostId}` | Bind and reply `connected`, or reply `waiting` |
//! | `control {hostId, payload}` | Forward `{type:control,payload}` to host, or drop |
//! | binary from owning host | Fan out verbatim to every bound viewer |
//! | binary from anyone else | Drop |
//! | bad JSON / unknown `type` | Log and ignore |
//!
//! Nothing here fails the connection: every error is logged and becomes a
//! [`Dispatch`] outcome.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::HostId;
use crate::protocol::{ClientMessage, Inbound, RelayMessage};

use super::{ConnectionLifecycle, ConnectionRegistry, Peer, Role, Session};

// ============================================================================
// Dispatch
// ============================================================================

/// Outcome of routing one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Sender registered as a host.
    Registered,
    /// Sender bound as a viewer and was sent `connected`.
    Connected,
    /// Requested host is missing; sender was sent `waiting`.
    Waiting,
    /// Message was queued to this many peers.
    ///
    /// Peers whose queue was full or closed are not counted.
    Forwarded {
        /// Number of peers the message was queued to.
        recipients: usize,
    },
    /// Message had no valid destination and was discarded.
    Dropped,
    /// Message was not understood and was discarded.
    Ignored,
}

// ============================================================================
// MessageRouter
// ============================================================================

/// Routes inbound messages between hosts and viewers.
///
/// Thread-safe; one instance is shared by every connection task.
#[derive(Debug, Clone)]
pub struct MessageRouter {
    lifecycle: ConnectionLifecycle,
}

impl MessageRouter {
    /// Creates a router over `registry`.
    #[inline]
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            lifecycle: ConnectionLifecycle::new(registry),
        }
    }

    /// Returns the lifecycle manager used to open and close sessions.
    #[inline]
    #[must_use]
    pub fn lifecycle(&self) -> &ConnectionLifecycle {
        &self.lifecycle
    }

    /// Returns the registry.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        self.lifecycle.registry()
    }

    /// Routes one message received on `session`.
    ///
    /// Never fails: malformed input is ignored, unknown destinations are
    /// dropped, and failed sends are left to the peer's own close event.
    pub fn handle_message(&self, session: &mut Session, inbound: Inbound) -> Dispatch {
        let result = match inbound {
            Inbound::Text(text) => self.route_text(session, &text),
            Inbound::Binary(data) => self.route_binary(session, data),
        };

        match result {
            Ok(dispatch) => dispatch,
            Err(Error::UnknownHost { host_id }) => {
                debug!(
                    conn_id = %session.id(),
                    host_id = %host_id,
                    "Control for unknown host dropped"
                );
                Dispatch::Dropped
            }
            Err(e) if e.is_routing_error() => {
                warn!(conn_id = %session.id(), error = %e, "Failed to parse incoming message");
                Dispatch::Ignored
            }
            Err(e) => {
                debug!(conn_id = %session.id(), error = %e, "Message dropped");
                Dispatch::Dropped
            }
        }
    }
}

// ============================================================================
// MessageRouter - Text
// ============================================================================

impl MessageRouter {
    fn route_text(&self, session: &mut Session, text: &str) -> Result<Dispatch> {
        let message = ClientMessage::parse(text)?;
        trace!(conn_id = %session.id(), kind = message.kind(), "Control envelope received");

        match message {
            ClientMessage::RegisterHost { id } => {
                self.lifecycle.become_host(session, id);
                Ok(Dispatch::Registered)
            }
            ClientMessage::ConnectClient { host_id } => Ok(self.connect_client(session, host_id)),
            ClientMessage::Control { host_id, payload } => self.forward_control(host_id, payload),
            ClientMessage::Unknown => {
                debug!(conn_id = %session.id(), "Unknown message type ignored");
                Ok(Dispatch::Ignored)
            }
        }
    }

    /// Binds `session` to `host_id` if that host is registered.
    ///
    /// A failed lookup leaves the session's current role untouched.
    fn connect_client(&self, session: &mut Session, host_id: HostId) -> Dispatch {
        if self.registry().lookup_host(&host_id).is_none() {
            debug!(conn_id = %session.id(), host_id = %host_id, "Host not found");
            reply(session.peer(), &RelayMessage::host_not_found());
            return Dispatch::Waiting;
        }

        self.lifecycle.become_viewer(session, host_id);
        reply(session.peer(), &RelayMessage::Connected);
        Dispatch::Connected
    }

    /// Forwards a viewer input event to the host named in the message.
    fn forward_control(&self, host_id: HostId, payload: Option<Value>) -> Result<Dispatch> {
        let host = self
            .registry()
            .lookup_host(&host_id)
            .ok_or_else(|| Error::unknown_host(host_id.clone()))?;

        host.send_json(&RelayMessage::Control { payload })?;
        trace!(host_id = %host_id, conn_id = %host.id(), "Control forwarded");

        Ok(Dispatch::Forwarded { recipients: 1 })
    }
}

// ============================================================================
// MessageRouter - Binary
// ============================================================================

impl MessageRouter {
    /// Fans a frame out to every viewer bound to the sender's host id.
    ///
    /// Only the connection that currently owns the host entry may publish
    /// frames; an orphaned host is ignored.
    fn route_binary(&self, session: &Session, data: Bytes) -> Result<Dispatch> {
        let Role::Host(host_id) = session.role() else {
            debug!(conn_id = %session.id(), bytes = data.len(), "Binary from non-host dropped");
            return Ok(Dispatch::Dropped);
        };

        if !self.registry().is_host_owner(host_id, session.id()) {
            debug!(conn_id = %session.id(), host_id = %host_id, "Binary from orphaned host dropped");
            return Ok(Dispatch::Dropped);
        }

        let viewers = self.registry().viewers_of(host_id);
        let mut recipients = 0;

        for viewer in &viewers {
            match viewer.send_binary(data.clone()) {
                Ok(()) => recipients += 1,
                Err(Error::QueueFull { conn_id }) => {
                    debug!(conn_id = %conn_id, host_id = %host_id, "Frame dropped for slow viewer");
                }
                Err(e) => debug!(conn_id = %viewer.id(), error = %e, "Frame not delivered"),
            }
        }

        trace!(
            host_id = %host_id,
            bytes = data.len(),
            recipients,
            viewers = viewers.len(),
            "Frame fanned out"
        );
        Ok(Dispatch::Forwarded { recipients })
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Sends a reply, treating a closed peer as a no-op.
fn reply(peer: &Peer, message: &RelayMessage) {
    if let Err(e) = peer.send_json(message) {
        debug!(conn_id = %peer.id(), error = %e, "Reply not delivered");
    }
}

// ============================================================================
// Tests
// ============================================================================
