mod app;
mod config;

use std::sync::Arc;

use tracing::{info, warn};

use murmur_api::{ApiOptions, ChatBus, build_schema};
use murmur_store::{Store, StoreOptions};
use murmur_types::models::Viewer;

use crate::app::ServerState;
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "murmur=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    info!(?config, "configuration loaded");
    if config.database_password.is_none() {
        warn!("MURMUR_DATABASE_PASSWORD is not set");
    }

    // Shared state
    let store = Arc::new(Store::seeded(StoreOptions {
        prune_on_delete: config.prune_on_delete,
    }));
    let bus = ChatBus::with_capacity(config.bus_capacity);
    let schema = build_schema(
        store,
        bus,
        ApiOptions {
            replay_seed_on_subscribe: config.replay_seed_on_subscribe,
        },
    );

    let state = ServerState {
        schema,
        viewer: Viewer::new(config.viewer_id.clone()),
    };
    let app = app::router(state);

    let addr = config.addr();
    info!("Murmur GraphQL server on http://{}/graphql", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
