//! Relay listen configuration.
//!
//! The only configuration surface is the listen address. The port defaults to
//! [`DEFAULT_PORT`] and can be overridden by the [`PORT_ENV`] environment
//! variable.
//!
//! # Example
//!
//! ```ignore
//! use screen_relay::RelayConfig;
//!
//! let config = RelayConfig::new().with_port(8080);
//! assert_eq!(config.socket_addr().port(), 8080);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Port used when nothing else is configured.
pub const DEFAULT_PORT: u16 = 3000;

/// Environment variable that overrides the listen port.
pub const PORT_ENV: &str = "PORT";

/// Default bind address (all interfaces).
const DEFAULT_BIND_IP: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

// ============================================================================
// RelayConfig
// ============================================================================

/// Listen address of the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayConfig {
    /// IP address to bind to.
    pub bind_ip: IpAddr,

    /// Port to bind to (0 lets the OS pick one).
    pub port: u16,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl RelayConfig {
    /// Creates the default configuration: all interfaces, [`DEFAULT_PORT`].
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bind_ip: DEFAULT_BIND_IP,
            port: DEFAULT_PORT,
        }
    }

    /// Creates a configuration bound to localhost on a random port.
    ///
    /// Used by tests and benchmarks.
    #[inline]
    #[must_use]
    pub const fn ephemeral() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
        }
    }

    /// Creates the default configuration with the port taken from
    /// [`PORT_ENV`] when it is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the variable is set but is not a valid
    /// port number.
    pub fn from_env() -> Result<Self> {
        match env::var(PORT_ENV) {
            Ok(value) => Ok(Self::new().with_port(parse_port(&value)?)),
            Err(env::VarError::NotPresent) => Ok(Self::new()),
            Err(env::VarError::NotUnicode(_)) => {
                Err(Error::config(format!("{PORT_ENV} is not valid unicode")))
            }
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl RelayConfig {
    /// Sets the listen port.
    #[inline]
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the bind address.
    #[inline]
    #[must_use]
    pub const fn with_bind_ip(mut self, bind_ip: IpAddr) -> Self {
        self.bind_ip = bind_ip;
        self
    }

    /// Returns the socket address to bind.
    #[inline]
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_port(value: &str) -> Result<u16> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|e| Error::config(format!("invalid {PORT_ENV} value {value:?}: {e}")))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.port, 3000);
        assert!(config.bind_ip.is_unspecified());
    }

    #[test]
    fn test_builder_methods() {
        let config = RelayConfig::new()
            .with_port(8080)
            .with_bind_ip(IpAddr::V4(Ipv4Addr::LOCALHOST));

        assert_eq!(
            config.socket_addr(),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080)
        );
    }

    #[test]
    fn test_ephemeral_config() {
        let config = RelayConfig::ephemeral();
        assert_eq!(config.port, 0);
        assert!(config.bind_ip.is_loopback());
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("4000").expect("valid port"), 4000);
        assert_eq!(parse_port(" 80 ").expect("trimmed port"), 80);
    }

    #[test]
    fn test_parse_port_rejects_garbage() {
        let err = parse_port("http").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));

        assert!(parse_port("70000").is_err());
        assert!(parse_port("").is_err());
    }
}
