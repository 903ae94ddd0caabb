//! Relay core: registry, routing and connection lifecycle.
//!
//! This module is transport-agnostic. The transport hands each connection a
//! [`Session`] from [`ConnectionLifecycle::open`], feeds its frames to
//! [`MessageRouter::handle_message`], and calls
//! [`ConnectionLifecycle::close`] when the socket goes away.
//!
//! # Architecture
//!
//! ```text
//!   transport ──frames──► MessageRouter ──lookup──► ConnectionRegistry
//!       │                      │                          ▲
//!       │                      └──► Peer (outbound queue) │
//!       └──open/close──► ConnectionLifecycle ─────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `lifecycle` | Session state and open/close side effects |
//! | `peer` | Fire-and-forget connection handle |
//! | `registry` | Host table and viewer table |
//! | `router` | Inbound message routing |

// ============================================================================
// Submodules
// ============================================================================

/// Session state and open/close side effects.
pub mod lifecycle;

/// Fire-and-forget connection handle.
pub mod peer;

/// Host table and viewer table.
pub mod registry;

/// Inbound message routing.
pub mod router;

// ============================================================================
// Re-exports
// ============================================================================

pub use lifecycle::{ConnectionLifecycle, Role, Session};
pub use peer::{OUTBOUND_CAPACITY, OutboundRx, Peer};
pub use registry::ConnectionRegistry;
pub use router::{Dispatch, MessageRouter};
