use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use processo_core::Config;
use tower_http::cors::CorsLayer;

mod artifacts;
mod handlers;
mod models;
mod state;
mod upload;


use state::AppState;

fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route(
            "/api/process-pdf",
            post(handlers::process_pdf::process_pdf),
        )
        .route(
            "/api/page-image/{id}",
            get(handlers::page_image::page_image),
        )
        .route("/api/process-ai", post(handlers::process_ai::process_ai))
        .route(
            "/api/download-json/{id}",
            get(handlers::download::download_json),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config =
        Config::from_file(&processo_core::config_file::load_config()).apply_env();
    tracing::debug!(?config, "configuration loaded");
    if config.openai.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; AI processing will return error messages");
    }

    let state = Arc::new(AppState::from_config(&config)?);
    let app = router(state, config.max_upload_bytes());

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
