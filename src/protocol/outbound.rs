//! Messages sent by the relay.
//!
//! # Formats
//!
//! ```json
//! {"type":"connected"}
//! {"type":"waiting","msg":"host not found"}
//! {"type":"error","msg":"..."}
//! {"type":"control","payload":{...}}
//! ```
//!
//! `error` is part of the vocabulary but the router never emits it.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Value, to_string};
use tokio_tungstenite::tungstenite::Message;

use crate::error::Result;

// ============================================================================
// Constants
// ============================================================================

/// Text sent with `waiting` when a viewer asks for an unregistered host.
pub const HOST_NOT_FOUND: &str = "host not found";

// ============================================================================
// RelayMessage
// ============================================================================

/// A JSON envelope sent from the relay to a host or viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayMessage {
    /// Viewer was bound to the requested host.
    Connected,

    /// Requested host is not registered.
    Waiting {
        /// Human-readable reason.
        msg: String,
    },

    /// Reserved error notice.
    Error {
        /// Human-readable reason.
        msg: String,
    },

    /// Input event forwarded to a host.
    Control {
        /// Event payload exactly as the viewer sent it.
        #[serde(
            default,
            deserialize_with = "super::present",
            skip_serializing_if = "Option::is_none"
        )]
        payload: Option<Value>,
    },
}

impl RelayMessage {
    /// Creates the `waiting` reply for an unknown host.
    #[inline]
    #[must_use]
    pub fn host_not_found() -> Self {
        Self::Waiting {
            msg: HOST_NOT_FOUND.to_string(),
        }
    }

    /// Serializes into a WebSocket text frame.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] if serialization fails.
    pub fn to_message(&self) -> Result<Message> {
        Ok(Message::text(to_string(self)?))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn encode(msg: &RelayMessage) -> Value {
        serde_json::to_value(msg).expect("serialize")
    }

    #[test]
    fn test_connected_format() {
        assert_eq!(encode(&RelayMessage::Connected), json!({"type": "connected"}));
    }

    #[test]
    fn test_waiting_format() {
        assert_eq!(
            encode(&RelayMessage::host_not_found()),
            json!({"type": "waiting", "msg": "host not found"})
        );
    }

    #[test]
    fn test_error_format() {
        let msg = RelayMessage::Error {
            msg: "boom".into(),
        };
        assert_eq!(encode(&msg), json!({"type": "error", "msg": "boom"}));
    }

    #[test]
    fn test_control_format() {
        let msg = RelayMessage::Control {
            payload: Some(json!({"type": "key", "action": "tap", "key": "enter"})),
        };
        assert_eq!(
            encode(&msg),
            json!({"type": "control", "payload": {"type": "key", "action": "tap", "key": "enter"}})
        );
    }

    #[test]
    fn test_control_without_payload_omits_field() {
        let msg = RelayMessage::Control { payload: None };
        assert_eq!(encode(&msg), json!({"type": "control"}));
    }

    #[test]
    fn test_control_with_null_payload_keeps_field() {
        let msg = RelayMessage::Control {
            payload: Some(Value::Null),
        };
        assert_eq!(
            serde_json::to_string(&msg).expect("serialize"),
            r#"{"type":"control","payload":null}"#
        );
    }

    #[test]
    fn test_to_message_is_text() {
        let frame = RelayMessage::Connected.to_message().expect("encode");
        assert!(frame.is_text());
        assert_eq!(frame.to_text().expect("text"), r#"{"type":"connected"}"#);
    }
}
