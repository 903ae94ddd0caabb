//! Screen Relay - WebSocket relay for remote-screen sessions.
//!
//! A host streams encoded screen frames and receives input events; a viewer
//! receives the frames and sends input events back. The relay pairs them by
//! host id and forwards bytes without looking inside them.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   binary frames    ┌─────────────┐   binary frames    ┌──────────┐
//! │   Host   │───────────────────►│    Relay    │───────────────────►│  Viewer  │
//! │          │◄───────────────────│ (in-memory) │◄───────────────────│          │
//! └──────────┘   control (JSON)   └─────────────┘   control (JSON)   └──────────┘
//! ```
//!
//! Key design principles:
//!
//! - One host connection per host id; the last registration wins
//! - A close only removes registry entries the closing connection still owns
//! - Forwarding is fire-and-forget; a slow peer never blocks routing
//! - Bad input from one connection never affects another
//!
//! # Quick Start
//!
//! ```no_run
//! use screen_relay::{RelayConfig, RelayServer, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let server = RelayServer::bind(RelayConfig::from_env()?).await?;
//!     println!("Relay listening on {}", server.ws_url());
//!
//!     tokio::signal::ctrl_c().await?;
//!     server.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Listen address and `PORT` override |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Wire message types |
//! | [`relay`] | Registry, router and connection lifecycle |
//! | [`transport`] | WebSocket server and per-connection event loop |

// ============================================================================
// Modules
// ============================================================================

/// Relay listen configuration.
pub mod config;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for connections and hosts.
pub mod identifiers;

/// Wire message types.
pub mod protocol;

/// Relay core.
///
/// - [`ConnectionRegistry`] - Host table and viewer table
/// - [`MessageRouter`] - Inbound message routing
/// - [`ConnectionLifecycle`] - Open/close side effects
pub mod relay;

/// WebSocket transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Configuration
pub use config::{DEFAULT_PORT, PORT_ENV, RelayConfig};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ConnectionId, HostId};

// Protocol types
pub use protocol::{ClientMessage, Inbound, RelayMessage};

// Relay core
pub use relay::{ConnectionLifecycle, ConnectionRegistry, Dispatch, MessageRouter, Peer, Role, Session};

// Transport
pub use transport::{RelayServer, RelayStats};
