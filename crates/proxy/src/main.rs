//! Waypoint - version-bridging game protocol proxy
//!
//! Main proxy binary

mod framing;
mod server;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use waypoint_config::ProxyConfig;
use waypoint_protocol::ProtocolVersion;

use crate::server::ProxyServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Waypoint starting up");

    let config = match ProxyConfig::load_default() {
        Ok(config) => {
            info!(path = waypoint_config::DEFAULT_CONFIG_PATH, "configuration loaded");
            config
        }
        Err(error) => {
            warn!(%error, "no usable configuration file, using defaults");
            ProxyConfig::default()
        }
    };

    info!(
        bind = %config.bind_address,
        backend = %config.backend_address,
        versions = %format_args!(
            "{} - {}",
            ProtocolVersion::MINIMUM,
            ProtocolVersion::MAXIMUM
        ),
        "proxy configured"
    );

    let server = ProxyServer::new(config);
    server
        .run()
        .await
        .context("proxy listener terminated")?;

    Ok(())
}
