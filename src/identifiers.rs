//! Type-safe identifiers for relay entities.
//!
//! Newtype wrappers prevent mixing a relay-assigned connection id with a
//! caller-supplied host id.
//!
//! | Type | Origin | Format |
//! |------|--------|--------|
//! | [`ConnectionId`] | Relay, on transport open | UUID v4 |
//! | [`HostId`] | Host, in `register_host` | Opaque string |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ConnectionId
// ============================================================================

/// Relay-generated identity of one transport connection.
///
/// Two handles refer to the same connection if and only if their ids are
/// equal. The registry uses this, not the host id, to decide whether a close
/// event still owns a host entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generates a fresh random connection id.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// HostId
// ============================================================================

/// Caller-supplied host identifier.
///
/// Not validated: any string, including the empty string, is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(String);

impl HostId {
    /// Creates a host id from any string.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HostId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for HostId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_ids_are_unique() {
        let a = ConnectionId::generate();
        let b = ConnectionId::generate();
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn test_connection_id_display_is_uuid() {
        let id = ConnectionId::generate();
        let uuid = Uuid::parse_str(&id.to_string()).expect("uuid");
        assert_eq!(uuid.get_version_num(), 4);
    }

    #[test]
    fn test_host_id_serde_transparent() {
        let id: HostId = serde_json::from_str("\"abc\"").expect("parse");
        assert_eq!(id.as_str(), "abc");
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "\"abc\"");
    }

    #[test]
    fn test_host_id_accepts_empty() {
        let id = HostId::new("");
        assert_eq!(id.to_string(), "");
    }
}
