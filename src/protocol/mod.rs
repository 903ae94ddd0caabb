//! Relay wire protocol.
//!
//! Hosts and viewers talk to the relay over one WebSocket each. Text frames
//! carry JSON envelopes tagged by `type`; binary frames carry screen frames.
//!
//! # Protocol Overview
//!
//! | Message | Direction | Purpose |
//! |---------|-----------|---------|
//! | `register_host` | Host → Relay | Claim a host id |
//! | `connect_client` | Viewer → Relay | Bind to a host id |
//! | `control` | Viewer → Relay → Host | Input event |
//! | `connected` | Relay → Viewer | Binding succeeded |
//! | `waiting` | Relay → Viewer | Host not registered |
//! | `error` | Relay → Client | Reserved |
//! | binary | Host → Relay → Viewers | Encoded screen frame |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `inbound` | Frame classification and client envelopes |
//! | `outbound` | Relay envelopes |
//!
//! # Payloads
//!
//! A `control` payload is forwarded as sent: an absent `payload` stays absent
//! and `"payload": null` stays `null`.

// ============================================================================
// Submodules
// ============================================================================

/// Messages received by the relay.
pub mod inbound;

/// Messages sent by the relay.
pub mod outbound;

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ============================================================================
// Re-exports
// ============================================================================

pub use inbound::{ClientMessage, Inbound};
pub use outbound::{HOST_NOT_FOUND, RelayMessage};

// ============================================================================
// Serde Helpers
// ============================================================================

/// Deserializes a field that is present, keeping `null` as `Some(Value::Null)`.
///
/// Paired with `#[serde(default)]` so a missing field becomes `None`.
pub(crate) fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
