//! # Swapchain Node
//!
//! Hosts proposal sessions over HTTP and WebSocket.

use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod api;
mod config;
mod engine;
mod state;

use config::NodeConfig;
use engine::SimulatedExecutor;
use state::AppState;

/// Run the node until the listener fails.
pub async fn run_server(config: NodeConfig) -> anyhow::Result<()> {
    let addr = config.addr()?;

    let executor = SimulatedExecutor::from_config(&config.executor);
    if let Some(message) = &config.executor.fail_with {
        info!("Executor will fail every swap with: {}", message);
    }
    let state = AppState::new(Arc::new(executor));

    let app = create_router(state);

    info!("Listening on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the API router.
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health::health_check))
        .route(
            "/api/v1/proposals",
            post(api::proposal::create_proposal).get(api::proposal::list_proposals),
        )
        .route(
            "/api/v1/proposals/:id",
            get(api::proposal::get_proposal).delete(api::proposal::delete_proposal),
        )
        .route("/api/v1/proposals/:id/fields", patch(api::proposal::update_field))
        .route("/api/v1/proposals/:id/submit", post(api::proposal::submit_proposal))
        .route("/ws/proposals/:id", get(api::ws::proposal_stream))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Swapchain node starting...");

    let config = NodeConfig::load()?;
    run_server(config).await
}
