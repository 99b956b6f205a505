use anyhow::{Context, Result};
use axum::{http::StatusCode, response::Json, routing::get, Router};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};

use stationmaster_core::ContentTables;
use stationmaster_server::config::Config;
use stationmaster_server::webhook::gateway_router;
use stationmaster_server::{AppState, ChatId, HttpMessenger, Messenger};

async fn health_check() -> Result<Json<serde_json::Value>, StatusCode> {
    Ok(Json(json!({
        "status": "healthy",
        "service": "stationmaster"
    })))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting stationmaster hunt bot");

    let config = Config::from_env().context("Failed to load configuration from environment")?;

    let tables = ContentTables::load(&config.clues_path, &config.codes_path)
        .context("Failed to load content tables")?;
    info!(
        "Loaded content tables for {} teams (clues: {}, codes: {})",
        tables.team_count(),
        config.clues_path.display(),
        config.codes_path.display()
    );

    let messenger: Arc<dyn Messenger> = Arc::new(HttpMessenger::new(
        &config.gateway_base_url,
        &config.gateway_bot_token,
    ));

    let app_state = Arc::new(AppState::new(
        Arc::new(tables),
        messenger,
        ChatId(config.admin_chat_id),
        config.gateway_webhook_secret.clone(),
    ));

    let app = Router::new()
        .route("/healthz", get(health_check))
        .merge(gateway_router(app_state.clone()))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    info!("Server listening on port {}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
