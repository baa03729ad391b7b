use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use kanthor_playground::config::{Args, PlaygroundConfig};
use kanthor_playground::registry::ClientRegistry;
use kanthor_playground::{AppState, build_router};
use kanthor_playground_core::tracing_init::init_tracing;
use kanthor_playground_core::{Clock, RealClock, RecordStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing("kanthor_playground=info,tower_http=info", args.log_json);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %args.addr,
        "Starting kanthor-playground"
    );

    let clock: Arc<dyn Clock> = Arc::new(RealClock::new());
    let store = RecordStore::open_weekly(&args.storage_path, clock).await?;
    match store.purge_expired().await {
        Ok(0) => {}
        Ok(purged) => info!(purged, "Purged expired records"),
        Err(e) => warn!(error = %e, "Failed to purge expired records"),
    }

    let config = PlaygroundConfig::from(&args);
    let registry = ClientRegistry::new();
    let restored = registry
        .load_from_store(&store, config.sdk_host.as_deref())
        .await?;
    info!(restored, "Restored platform clients");

    let state = AppState::new(config, store.clone(), registry)?;
    let app = build_router(state);

    let listener = TcpListener::bind(args.addr).await?;
    info!(addr = %args.addr, "Playground listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    info!("Playground stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
