//! Seger MCP Server - Entry point
//!
//! Serves the Seger invoice tools over stdio.

use seger_mcp_server::run_server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seger_mcp_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run_server().await {
        tracing::error!(error = %e, "Fatal error in main");
        return Err(e);
    }

    Ok(())
}
