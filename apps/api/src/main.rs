mod config;
mod db;
mod drafting;
mod errors;
mod listings;
mod llm_client;
mod models;
mod normalize;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StorageBackend};
use crate::db::create_pool;
use crate::listings::store::{ListingStore, MemListingStore, PgListingStore};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resell API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize listing storage
    let listings: Arc<dyn ListingStore> = match config.storage {
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for postgres storage")?;
            Arc::new(PgListingStore::new(create_pool(url).await?))
        }
        StorageBackend::Memory => {
            info!("Using in-memory listing storage; posts are lost on restart");
            Arc::new(MemListingStore::new())
        }
    };

    // Initialize LLM client
    let mut llm = LlmClient::new(config.openai_api_key.clone());
    if let Some(url) = &config.openai_api_url {
        llm = llm.with_api_url(url.clone());
    }
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Build app state
    let state = AppState {
        listings,
        generator: Arc::new(llm),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
