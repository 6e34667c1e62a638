use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, OriginalUri},
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::info;

use super::songs_routes::make_songs_routes;
use super::stats_routes::make_stats_routes;
use super::{log_requests, state::*, ServerConfig};

#[derive(Serialize)]
struct Health {
    status: &'static str,
    time: String,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// JSON 404 for unknown paths, and for known paths hit with a method they
/// don't serve.
pub(super) async fn route_not_found(
    OriginalUri(uri): OriginalUri,
) -> (StatusCode, Json<Value>) {
    let path = uri
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_else(|| uri.path());
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Route not found", "path": path })),
    )
}

pub fn make_app(config: ServerConfig, song_store: GuardedSongStore) -> Router {
    let state = ServerState::new(config.clone(), song_store);

    Router::new()
        .route("/health", get(health))
        .method_not_allowed_fallback(route_not_found)
        .nest("/api/songs", make_songs_routes(state.clone()))
        .nest("/api/stats", make_stats_routes(state.clone()))
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(middleware::from_fn_with_state(state, log_requests))
        .layer(CorsLayer::permissive())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, stopping server"),
        Err(err) => tracing::error!("Failed to listen for shutdown signal: {}", err),
    }
}

pub async fn run_server(config: ServerConfig, song_store: GuardedSongStore) -> Result<()> {
    let address = format!("{}:{}", config.bind_address, config.port);
    let app = make_app(config, song_store);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Songs API listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
