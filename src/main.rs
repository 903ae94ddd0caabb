//! `screen-relay` binary.
//!
//! Run with: `screen-relay --port 3000` or `PORT=3000 screen-relay`.
//! Log level is controlled by `RUST_LOG` (default `screen_relay=info`).

use std::net::{IpAddr, Ipv4Addr};

use clap::Parser;
use screen_relay::{RelayConfig, RelayServer, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ============================================================================
// Arguments
// ============================================================================

/// In-memory WebSocket relay pairing remote-screen hosts with viewers.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Arguments {
    /// Port to listen on. Overrides `PORT`; defaults to 3000 when neither is set.
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind to.
    #[arg(short, long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    bind: IpAddr,
}

impl Arguments {
    /// Layers the command-line flags over [`RelayConfig::from_env`].
    fn config(&self) -> Result<RelayConfig> {
        let config = RelayConfig::from_env()?.with_bind_ip(self.bind);

        Ok(match self.port {
            Some(port) => config.with_port(port),
            None => config,
        })
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Arguments::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "screen_relay=info".into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let server = RelayServer::bind(args.config()?).await?;
    info!(url = %server.ws_url(), "Relay listening");

    wait_for_signal().await?;
    server.shutdown().await;

    Ok(())
}

/// Waits for Ctrl+C, or SIGTERM on Unix.
async fn wait_for_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Arguments::command().debug_assert();
    }

    #[test]
    fn test_port_flag() {
        let args = Arguments::try_parse_from(["screen-relay", "--port", "8080", "--bind", "127.0.0.1"])
            .expect("valid args");
        let config = args.config().expect("config");

        assert_eq!(config.port, 8080);
        assert!(config.bind_ip.is_loopback());
    }

    #[test]
    fn test_port_defaults_to_environment() {
        let args = Arguments::try_parse_from(["screen-relay"]).expect("valid args");
        assert_eq!(args.port, None);
        assert!(args.bind.is_unspecified());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(Arguments::try_parse_from(["screen-relay", "--port", "abc"]).is_err());
    }
}
