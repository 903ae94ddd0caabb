//! Per-connection state and its registry side effects.
//!
//! # State Machine
//!
//! ```text
//!                  register_host
//!              ┌──────────────────► Host(id) ───┐
//!   open ──► Unbound                            ├──► close (terminal)
//!              └──────────────────► Viewer(id) ─┘
//!                connect_client (host found)
//! ```
//!
//! A connection can switch roles later. The registry entries of the old role
//! are released first, with the same identity guard used on close.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tracing::{debug, info};

use crate::identifiers::{ConnectionId, HostId};

use super::{ConnectionRegistry, Peer};

// ============================================================================
// Role
// ============================================================================

/// What a connection currently is to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Role {
    /// Connected, has not registered or bound yet.
    #[default]
    Unbound,
    /// Registered as a host under this id.
    Host(HostId),
    /// Bound as a viewer to this host id.
    Viewer(HostId),
}

// ============================================================================
// Session
// ============================================================================

/// State of one open connection.
///
/// Owned by that connection's event loop, so messages from one connection
/// are applied in order.
#[derive(Debug)]
pub struct Session {
    peer: Peer,
    role: Role,
}

impl Session {
    /// Returns the connection id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.peer.id()
    }

    /// Returns the connection handle.
    #[inline]
    #[must_use]
    pub fn peer(&self) -> &Peer {
        &self.peer
    }

    /// Returns the current role.
    #[inline]
    #[must_use]
    pub fn role(&self) -> &Role {
        &self.role
    }
}

// ============================================================================
// ConnectionLifecycle
// ============================================================================

/// Applies open, close and role changes to the registry.
#[derive(Debug, Clone)]
pub struct ConnectionLifecycle {
    registry: Arc<ConnectionRegistry>,
}

impl ConnectionLifecycle {
    /// Creates a lifecycle manager over `registry`.
    #[inline]
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the registry.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Starts a session for a newly opened connection.
    ///
    /// The session begins [`Role::Unbound`] and touches no registry table.
    #[must_use]
    pub fn open(&self, peer: Peer) -> Session {
        debug!(conn_id = %peer.id(), "Connection opened");
        Session {
            peer,
            role: Role::Unbound,
        }
    }

    /// Ends a session.
    ///
    /// Removes the host entry only if this connection still owns it, and
    /// drops the viewer binding. Nobody is notified.
    pub fn close(&self, mut session: Session) {
        let role = session.role.clone();
        self.release(&mut session);
        debug!(conn_id = %session.id(), ?role, "Connection closed");
    }

    /// Registers the session as host `host_id`.
    ///
    /// Returns the connection that previously held `host_id`, if any. That
    /// connection stays open but is no longer routable.
    pub fn become_host(&self, session: &mut Session, host_id: HostId) -> Option<Peer> {
        if session.role != Role::Host(host_id.clone()) {
            self.release(session);
        }

        let evicted = self
            .registry
            .register_host(host_id.clone(), session.peer.clone());

        info!(host_id = %host_id, conn_id = %session.id(), "Host registered");
        if let Some(ref old) = evicted {
            info!(
                host_id = %host_id,
                evicted = %old.id(),
                "Host id re-registered, previous connection orphaned"
            );
        }

        session.role = Role::Host(host_id);
        evicted
    }

    /// Binds the session as a viewer of `host_id`.
    ///
    /// The caller must have checked that `host_id` is registered.
    pub fn become_viewer(&self, session: &mut Session, host_id: HostId) {
        if matches!(session.role, Role::Host(_)) {
            self.release(session);
        }

        self.registry
            .add_viewer(session.peer.clone(), host_id.clone());

        info!(host_id = %host_id, conn_id = %session.id(), "Viewer connected to host");
        session.role = Role::Viewer(host_id);
    }

    /// Clears the registry entries of the session's current role.
    fn release(&self, session: &mut Session) {
        match std::mem::take(&mut session.role) {
            Role::Unbound => {}
            Role::Host(host_id) => {
                if self
                    .registry
                    .unregister_host_if_owned(&host_id, session.id())
                {
                    info!(host_id = %host_id, conn_id = %session.id(), "Host unregistered");
                }
            }
            Role::Viewer(_) => {
                self.registry.remove_viewer(session.id());
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
