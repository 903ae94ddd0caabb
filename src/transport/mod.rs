//! WebSocket transport layer.
//!
//! Accepts TCP connections, upgrades them to WebSocket, and drives one event
//! loop per connection that feeds the relay core.
//!
//! # Connection Lifecycle
//!
//! 1. `RelayServer::bind` - Bind listener, spawn accept loop
//! 2. `accept_async` - Upgrade TCP to WebSocket
//! 3. `Connection::run` - Open session, route frames, write queued replies
//! 4. Socket close or `RelayServer::shutdown` - Close session, clear registry
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Per-connection event loop |
//! | `server` | Listener, accept loop and shutdown |

// ============================================================================
// Submodules
// ============================================================================

/// Per-connection event loop.
pub mod connection;

/// Listener, accept loop and shutdown.
pub mod server;

// ============================================================================
// Re-exports
// ============================================================================

pub(crate) use connection::Connection;
pub use server::{RelayServer, RelayStats};
