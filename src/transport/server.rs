//! WebSocket server hosts and viewers connect to.
//!
//! # Connection Flow
//!
//! 1. [`RelayServer::bind`] binds the listener and spawns the accept loop
//! 2. Each TCP connection is upgraded to WebSocket on its own task
//! 3. The upgraded socket runs a [`Connection`] event loop until it closes
//! 4. [`RelayServer::shutdown`] stops accepting and closes every connection
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐                                     ┌──────────┐
//! │  Host    │──register_host / frames ──┐         │  Viewer  │
//! └──────────┘                           ▼         └──────────┘
//!                               ┌─────────────────┐     ▲  │
//!                               │   RelayServer   │─────┘  │ connect_client
//!                               │  (single port)  │◄───────┘ control
//!                               └─────────────────┘
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::RelayConfig;
use crate::error::Result;
use crate::relay::{ConnectionRegistry, MessageRouter};

use super::Connection;

// ============================================================================
// Constants
// ============================================================================

/// How often the accept loop wakes up to check the shutdown flag.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// RelayStats
// ============================================================================

/// Point-in-time counters for a running relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelayStats {
    /// Open WebSocket connections, in any role.
    pub connections: usize,
    /// Registered hosts.
    pub hosts: usize,
    /// Bound viewers.
    pub viewers: usize,
}

// ============================================================================
// RelayServer
// ============================================================================

/// Accepts host and viewer connections and routes between them.
///
/// # Example
///
/// ```ignore
/// let server = RelayServer::bind(RelayConfig::new()).await?;
/// println!("Relay listening on {}", server.ws_url());
///
/// tokio::signal::ctrl_c().await?;
/// server.shutdown().await;
/// ```
pub struct RelayServer {
    /// Address the listener is bound to.
    local_addr: SocketAddr,

    /// Router shared by every connection task.
    router: Arc<MessageRouter>,

    /// Number of live connection tasks.
    connections: Arc<AtomicUsize>,

    /// Tells connection loops to close.
    shutdown_tx: watch::Sender<bool>,

    /// Shutdown flag for the accept loop.
    shutdown: AtomicBool,
}

// ============================================================================
// RelayServer - Constructor
// ============================================================================

impl RelayServer {
    /// Binds the listener and starts the accept loop.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if binding fails.
    pub async fn bind(config: RelayConfig) -> Result<Arc<Self>> {
        let listener = TcpListener::bind(config.socket_addr()).await?;
        let local_addr = listener.local_addr()?;

        debug!(%local_addr, "Relay WebSocket server bound");

        let (shutdown_tx, _) = watch::channel(false);
        let server = Arc::new(Self {
            local_addr,
            router: Arc::new(MessageRouter::new(Arc::new(ConnectionRegistry::new()))),
            connections: Arc::new(AtomicUsize::new(0)),
            shutdown_tx,
            shutdown: AtomicBool::new(false),
        });

        let server_clone = Arc::clone(&server);
        tokio::spawn(async move {
            server_clone.accept_loop(listener).await;
        });

        info!(port = local_addr.port(), "Relay started");

        Ok(server)
    }
}

// ============================================================================
// RelayServer - Public API
// ============================================================================

impl RelayServer {
    /// Returns the port the relay is bound to.
    #[inline]
    #[must_use]
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Returns the bound socket address.
    #[inline]
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns a WebSocket URL clients on this machine can use.
    ///
    /// Format: `ws://{ip}:{port}`, with an unspecified bind address shown
    /// as `127.0.0.1`.
    #[must_use]
    pub fn ws_url(&self) -> String {
        let ip = match self.local_addr.ip() {
            ip if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
            ip => ip,
        };
        format!("ws://{}", SocketAddr::new(ip, self.local_addr.port()))
    }

    /// Returns the router shared by every connection.
    #[inline]
    #[must_use]
    pub fn router(&self) -> &Arc<MessageRouter> {
        &self.router
    }

    /// Returns the connection registry.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        self.router.registry()
    }

    /// Returns current connection, host and viewer counts.
    #[must_use]
    pub fn stats(&self) -> RelayStats {
        RelayStats {
            connections: self.connections.load(Ordering::SeqCst),
            hosts: self.registry().host_count(),
            viewers: self.registry().viewer_count(),
        }
    }

    /// Stops accepting connections and closes every open one.
    pub async fn shutdown(&self) {
        info!(stats = ?self.stats(), "Relay shutting down");

        self.shutdown.store(true, Ordering::SeqCst);
        self.shutdown_tx.send_replace(true);

        info!("Relay shutdown complete");
    }
}

// ============================================================================
// RelayServer - Accept Loop
// ============================================================================

impl RelayServer {
    /// Background task that accepts new connections.
    async fn accept_loop(self: Arc<Self>, listener: TcpListener) {
        debug!("Accept loop started");

        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                debug!("Accept loop shutting down");
                break;
            }

            // Accept with timeout to allow checking shutdown flag
            match timeout(ACCEPT_POLL_INTERVAL, listener.accept()).await {
                Ok(Ok((stream, addr))) => {
                    let server = Arc::clone(&self);
                    tokio::spawn(async move {
                        match server.handle_connection(stream, addr).await {
                            Ok(()) => {}
                            Err(e) if e.is_connection_error() => {
                                debug!(error = %e, ?addr, "WebSocket upgrade failed");
                            }
                            Err(e) => warn!(error = %e, ?addr, "Connection handling failed"),
                        }
                    });
                }
                Ok(Err(e)) => {
                    error!(error = %e, "Accept failed");
                }
                Err(_) => continue,
            }
        }

        debug!("Accept loop terminated");
    }

    /// Upgrades one TCP connection and runs its event loop to completion.
    async fn handle_connection(&self, stream: TcpStream, addr: SocketAddr) -> Result<()> {
        debug!(?addr, "New TCP connection");

        let ws_stream = tokio_tungstenite::accept_async(stream).await?;

        info!(?addr, "WebSocket connection established");

        self.connections.fetch_add(1, Ordering::SeqCst);
        Connection::new(ws_stream, addr)
            .run(Arc::clone(&self.router), self.shutdown_tx.subscribe())
            .await;
        self.connections.fetch_sub(1, Ordering::SeqCst);

        info!(?addr, "WebSocket connection closed");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
