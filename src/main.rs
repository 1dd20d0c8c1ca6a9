use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use whereat::{open_record_store, AppConfig, AppState, Directory, HttpServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().context("loading configuration")?;
    info!("Where@ server v{}", whereat::version());
    info!("Store backend: {:?}", config.store.backend);

    let store = open_record_store(&config.store).context("opening record store")?;
    let state = AppState::new(Directory::new(Arc::clone(&store)), config.org.max_chain_depth);

    HttpServer::new(state, config.server.clone())
        .start()
        .await
        .with_context(|| format!("serving on {}", config.bind_addr()))?;

    Ok(())
}
