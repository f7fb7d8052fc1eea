//! cordgate demo binary.
//!
//! - Loads `cordgate.yaml` (or the path given as the first argument)
//! - `CORDGATE_TOKEN` overrides the configured token
//! - Logs every dispatch event name until Ctrl-C

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use cordgate_client::transport::WsTransportFactory;
use cordgate_client::{config, GatewayClient, HandlerRegistry};
use cordgate_core::protocol::OpCode;
use cordgate_core::Result;

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "cordgate.yaml".into());
    let mut cfg = config::load_from_file(&path)?;
    if let Ok(token) = std::env::var("CORDGATE_TOKEN") {
        cfg.gateway.token = token;
    }

    let registry = HandlerRegistry::new();
    registry.on_op_code(OpCode::DISPATCH, |env| {
        tracing::info!(event = env.event().unwrap_or_default(), seq = ?env.seq(), "dispatch");
        Ok(())
    });

    let client = GatewayClient::connect_with_registry(cfg, Arc::new(WsTransportFactory::new()), registry)?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler failed, shutting down");
    }
    client.close().await;
    Ok(())
}
