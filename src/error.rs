//! Error types for the screen relay.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! Fallible setup operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use screen_relay::{RelayConfig, RelayServer, Result};
//!
//! async fn example() -> Result<()> {
//!     let server = RelayServer::bind(RelayConfig::from_env()?).await?;
//!     server.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! Routing errors ([`Error::MalformedMessage`], [`Error::UnknownHost`]) never
//! leave the router: they are logged and turned into a no-op.
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::WebSocket`], [`Error::ConnectionClosed`] |
//! | Delivery | [`Error::QueueFull`] |
//! | Routing | [`Error::MalformedMessage`], [`Error::UnknownHost`] |
//! | External | [`Error::Io`], [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::{ConnectionId, HostId};

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when the relay configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket protocol error.
    ///
    /// Returned when the upgrade handshake fails.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// Peer connection is gone.
    ///
    /// Returned when a send targets a connection whose event loop ended.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Peer's outbound queue is full.
    ///
    /// The peer's socket is not keeping up; the message was dropped for that
    /// peer only.
    #[error("Outbound queue full for connection {conn_id}")]
    QueueFull {
        /// The lagging connection.
        conn_id: ConnectionId,
    },

    // ========================================================================
    // Routing Errors
    // ========================================================================
    /// Inbound text is not a valid control envelope.
    #[error("Malformed message: {message}")]
    MalformedMessage {
        /// Parser diagnostic.
        message: String,
    },

    /// No host is registered under the requested id.
    #[error("Unknown host: {host_id}")]
    UnknownHost {
        /// The requested host id.
        host_id: HostId,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a full-queue error for `conn_id`.
    #[inline]
    pub fn queue_full(conn_id: ConnectionId) -> Self {
        Self::QueueFull { conn_id }
    }

    /// Creates a malformed message error.
    #[inline]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedMessage {
            message: message.into(),
        }
    }

    /// Creates an unknown host error.
    #[inline]
    pub fn unknown_host(host_id: HostId) -> Self {
        Self::UnknownHost { host_id }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error comes from the peer's connection rather
    /// than from the relay.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::ConnectionClosed | Self::WebSocket(_))
    }

    /// Returns `true` if this error came from routing a single message.
    ///
    /// Routing errors are local to one message and never close a connection.
    #[inline]
    #[must_use]
    pub fn is_routing_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedMessage { .. } | Self::UnknownHost { .. } | Self::Json(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
