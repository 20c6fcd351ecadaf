//! decor-chat - bilingual furniture assistant
//!
//! Resolves decoration requests locally with a slot-filling intent resolver,
//! falls back to a remote language model for everything else, and relays
//! scene commands to connected 3D clients over a websocket.

mod api;
mod completion;
mod config;
mod db;
mod intent;
mod relay;
mod runtime;
mod system_prompt;
mod title_generator;

use api::{create_router, AppState};
use completion::CompletionClient;
use config::AppConfig;
use db::Database;
use intent::{Catalog, ResolverSettings};
use relay::RelayHub;
use runtime::RuntimeManager;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "decor_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env()?;

    // Initialize database
    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;

    let catalog = Arc::new(load_catalog(&config));

    // Remote completion client
    let client = CompletionClient::from_config(&config.completion)?;
    if config.completion.api_key.is_none() {
        tracing::warn!(
            provider = %client.provider(),
            "No LLM_API_KEY configured; remote replies will fail"
        );
    }
    tracing::info!(
        provider = %client.provider(),
        models = ?client.models(),
        "Completion client initialized"
    );

    let system_prompt = system_prompt::build_system_prompt(
        &catalog,
        config.system_prompt_override.as_deref(),
    );

    let relay = Arc::new(RelayHub::new());
    let runtime = Arc::new(RuntimeManager::new(
        db,
        Arc::new(client),
        relay.clone(),
        catalog.clone(),
        ResolverSettings {
            reprompt_limit: config.reprompt_limit,
        },
        system_prompt,
    ));

    // Create application state
    let state = AppState::new(runtime, relay, catalog);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("decor-chat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Configured catalog, or the bundled one when it is missing or invalid
fn load_catalog(config: &AppConfig) -> Catalog {
    let Some(path) = &config.catalog_path else {
        return Catalog::builtin();
    };

    match Catalog::load(path) {
        Ok(catalog) => {
            tracing::info!(
                path = %path.display(),
                categories = catalog.furniture.len(),
                "Loaded catalog"
            );
            catalog
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Falling back to built-in catalog");
            Catalog::builtin()
        }
    }
}
