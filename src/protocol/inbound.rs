//! Messages received by the relay.
//!
//! # Formats
//!
//! | Kind | Frame | Content |
//! |------|-------|---------|
//! | [`ClientMessage::RegisterHost`] | text | `{"type":"register_host","id":"<hostId>"}` |
//! | [`ClientMessage::ConnectClient`] | text | `{"type":"connect_client","hostId":"<hostId>"}` |
//! | [`ClientMessage::Control`] | text | `{"type":"control","hostId":"<hostId>","payload":{...}}` |
//! | [`Inbound::Binary`] | binary | One encoded screen frame, never parsed |

// ============================================================================
// Imports
// ============================================================================

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Value, from_str};
use tokio_tungstenite::tungstenite::Message;

use crate::error::{Error, Result};
use crate::identifiers::HostId;

// ============================================================================
// Inbound
// ============================================================================

/// A raw message delivered by the transport, classified by frame kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Text frame, expected to hold a JSON control envelope.
    Text(String),
    /// Binary frame, passed through untouched.
    Binary(Bytes),
}

impl Inbound {
    /// Classifies a WebSocket message.
    ///
    /// Returns `None` for control frames (ping, pong, close) which the
    /// router never sees.
    #[must_use]
    pub fn from_message(message: Message) -> Option<Self> {
        match message {
            Message::Text(text) => Some(Self::Text(text.as_str().to_owned())),
            Message::Binary(data) => Some(Self::Binary(data)),
            _ => None,
        }
    }
}

// ============================================================================
// ClientMessage
// ============================================================================

/// A JSON control envelope sent by a host or a viewer.
///
/// Unrecognized `type` values parse as [`ClientMessage::Unknown`] so they can
/// be told apart from text that is not an envelope at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Host announces itself under `id`.
    RegisterHost {
        /// Host id to register.
        id: HostId,
    },

    /// Viewer asks to be bound to a host.
    ConnectClient {
        /// Host id to bind to.
        #[serde(rename = "hostId")]
        host_id: HostId,
    },

    /// Viewer input event for a host.
    Control {
        /// Destination host id.
        #[serde(rename = "hostId")]
        host_id: HostId,
        /// Input event, forwarded verbatim.
        #[serde(
            default,
            deserialize_with = "super::present",
            skip_serializing_if = "Option::is_none"
        )]
        payload: Option<Value>,
    },

    /// Any other `type`.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Parses a text frame into an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedMessage`] if the text is not JSON or lacks
    /// the fields its `type` requires.
    pub fn parse(text: &str) -> Result<Self> {
        from_str(text).map_err(|e| Error::malformed(e.to_string()))
    }

    /// Returns the wire name of the envelope type.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RegisterHost { .. } => "register_host",
            Self::ConnectClient { .. } => "connect_client",
            Self::Control { .. } => "control",
            Self::Unknown => "unknown",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_parse_register_host() {
        let msg = ClientMessage::parse(r#"{"type":"register_host","id":"abc"}"#).expect("parse");
        assert_eq!(
            msg,
            ClientMessage::RegisterHost {
                id: HostId::new("abc")
            }
        );
        assert_eq!(msg.kind(), "register_host");
    }

    #[test]
    fn test_parse_connect_client() {
        let msg =
            ClientMessage::parse(r#"{"type":"connect_client","hostId":"abc"}"#).expect("parse");
        assert_eq!(
            msg,
            ClientMessage::ConnectClient {
                host_id: HostId::new("abc")
            }
        );
    }

    #[test]
    fn test_parse_control_keeps_payload() {
        let text = r#"{"type":"control","hostId":"abc","payload":{"type":"mouse","action":"click","x":10,"y":20}}"#;
        let msg = ClientMessage::parse(text).expect("parse");

        let ClientMessage::Control { host_id, payload } = msg else {
            panic!("expected control");
        };
        assert_eq!(host_id.as_str(), "abc");
        assert_eq!(
            payload,
            Some(json!({"type": "mouse", "action": "click", "x": 10, "y": 20}))
        );
    }

    #[test]
    fn test_parse_control_without_payload() {
        let msg = ClientMessage::parse(r#"{"type":"control","hostId":"abc"}"#).expect("parse");
        assert!(matches!(msg, ClientMessage::Control { payload: None, .. }));
    }

    #[test]
    fn test_parse_control_keeps_null_payload() {
        let msg = ClientMessage::parse(r#"{"type":"control","hostId":"abc","payload":null}"#)
            .expect("parse");
        assert!(matches!(
            msg,
            ClientMessage::Control {
                payload: Some(Value::Null),
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_type() {
        let msg = ClientMessage::parse(r#"{"type":"ping","extra":1}"#).expect("parse");
        assert_eq!(msg, ClientMessage::Unknown);
    }

    #[test]
    fn test_malformed_json() {
        let err = ClientMessage::parse("not json").unwrap_err();
        assert!(matches!(err, Error::MalformedMessage { .. }));
    }

    #[test]
    fn test_missing_required_field() {
        let err = ClientMessage::parse(r#"{"type":"register_host"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedMessage { .. }));
    }

    #[test]
    fn test_missing_type() {
        assert!(ClientMessage::parse(r#"{"id":"abc"}"#).is_err());
    }

    #[test]
    fn test_inbound_from_message() {
        let text = Inbound::from_message(Message::text("hi"));
        assert_eq!(text, Some(Inbound::Text("hi".into())));

        let binary = Inbound::from_message(Message::binary(vec![1u8, 2, 3]));
        assert_eq!(binary, Some(Inbound::Binary(Bytes::from_static(&[1, 2, 3]))));

        assert_eq!(Inbound::from_message(Message::Ping(Bytes::new())), None);
    }
}
