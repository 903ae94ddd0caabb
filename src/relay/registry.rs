//! Connection registry.
//!
//! Holds the two pieces of shared relay state: the host table and the viewer
//! table. Nothing outside this module touches the maps.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              ConnectionRegistry             │
//! │  hosts                                      │
//! │    "abc" → Peer(conn 1)                     │
//! │    "xyz" → Peer(conn 4)                     │
//! │  viewers                                    │
//! │    conn 2 → (Peer(conn 2), "abc")           │
//! │    conn 3 → (Peer(conn 3), "abc")           │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Locks are `parking_lot` and are never held across an `.await` or while
//! another table's lock is held.

// ============================================================================
// Imports
// ============================================================================

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::identifiers::{ConnectionId, HostId};

use super::Peer;

// ============================================================================
// ViewerEntry
// ============================================================================

/// A tracked viewer and the host id it is bound to.
#[derive(Debug, Clone)]
struct ViewerEntry {
    peer: Peer,
    host_id: HostId,
}

// ============================================================================
// ConnectionRegistry
// ============================================================================

/// Host table and viewer table.
///
/// Thread-safe; share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    /// Registered hosts by host id. Last registration wins.
    hosts: RwLock<FxHashMap<HostId, Peer>>,

    /// Bound viewers by connection id.
    viewers: RwLock<FxHashMap<ConnectionId, ViewerEntry>>,
}

// ============================================================================
// ConnectionRegistry - Hosts
// ============================================================================

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `host_id` to `peer`, replacing any previous entry.
    ///
    /// The replaced connection is neither closed nor notified. It is
    /// returned when it differs from `peer` so the caller can log it.
    pub fn register_host(&self, host_id: HostId, peer: Peer) -> Option<Peer> {
        let previous = self.hosts.write().insert(host_id, peer.clone());
        previous.filter(|old| *old != peer)
    }

    /// Returns the connection currently registered under `host_id`.
    #[must_use]
    pub fn lookup_host(&self, host_id: &HostId) -> Option<Peer> {
        self.hosts.read().get(host_id).cloned()
    }

    /// Returns `true` if `host_id` is registered to connection `conn_id`.
    #[must_use]
    pub fn is_host_owner(&self, host_id: &HostId, conn_id: ConnectionId) -> bool {
        self.hosts
            .read()
            .get(host_id)
            .is_some_and(|peer| peer.id() == conn_id)
    }

    /// Removes `host_id` only if it still maps to connection `conn_id`.
    ///
    /// A stale close from a connection that has since been replaced under the
    /// same id leaves the newer registration alone.
    ///
    /// Returns `true` if an entry was removed.
    pub fn unregister_host_if_owned(&self, host_id: &HostId, conn_id: ConnectionId) -> bool {
        let mut hosts = self.hosts.write();
        match hosts.get(host_id) {
            Some(peer) if peer.id() == conn_id => {
                hosts.remove(host_id);
                true
            }
            Some(peer) => {
                debug!(
                    host_id = %host_id,
                    conn_id = %conn_id,
                    owner = %peer.id(),
                    "Host entry owned by another connection, keeping it"
                );
                false
            }
            None => false,
        }
    }

    /// Returns the number of registered hosts.
    #[inline]
    #[must_use]
    pub fn host_count(&self) -> usize {
        self.hosts.read().len()
    }
}

// ============================================================================
// ConnectionRegistry - Viewers
// ============================================================================

impl ConnectionRegistry {
    /// Tracks `peer` as a viewer bound to `host_id`.
    ///
    /// Re-adding the same connection replaces its binding.
    pub fn add_viewer(&self, peer: Peer, host_id: HostId) {
        self.viewers
            .write()
            .insert(peer.id(), ViewerEntry { peer, host_id });
    }

    /// Stops tracking viewer `conn_id`.
    ///
    /// Returns the host id it was bound to, if it was tracked.
    pub fn remove_viewer(&self, conn_id: ConnectionId) -> Option<HostId> {
        self.viewers
            .write()
            .remove(&conn_id)
            .map(|entry| entry.host_id)
    }

    /// Returns the host id viewer `conn_id` is bound to.
    #[must_use]
    pub fn viewer_binding(&self, conn_id: ConnectionId) -> Option<HostId> {
        self.viewers
            .read()
            .get(&conn_id)
            .map(|entry| entry.host_id.clone())
    }

    /// Returns every viewer currently bound to `host_id`.
    #[must_use]
    pub fn viewers_of(&self, host_id: &HostId) -> Vec<Peer> {
        self.viewers
            .read()
            .values()
            .filter(|entry| entry.host_id == *host_id)
            .map(|entry| entry.peer.clone())
            .collect()
    }

    /// Returns the number of tracked viewers.
    #[inline]
    #[must_use]
    pub fn viewer_count(&self) -> usize {
        self.viewers.read().len()
    }
}

// ============================================================================
// Tests
// ============================================================================
