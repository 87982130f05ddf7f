//! Tasks API - HTTP Server Entry Point

use tasks_api::{api, config::Config};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading configuration
    let dotenv = dotenvy::dotenv();

    let config = Config::from_env()?;

    // Initialize logging
    let default_filter = if config.debug {
        "tasks_api=debug,tower_http=debug"
    } else {
        "tasks_api=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = dotenv {
        warn!("No .env file loaded ({}), using system environment", e);
    }
    if config.debug {
        info!("Running in debug mode: {:?}", config);
    }

    info!(
        "Starting {} v{} on {} in {} mode",
        config.app_name,
        config.app_version,
        config.addr(),
        config.environment
    );

    api::serve(config).await?;

    Ok(())
}
