use std::sync::Arc;

use anyhow::Context;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{extract::FromRef, http::StatusCode, routing::get, Router};
use prometheus::{Encoder, TextEncoder};
use routes::{backend_router, quiz_router};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configuration::Settings;
use crate::inference::BackendClient;

use super::routes;

#[derive(FromRef, Clone)]
pub struct AppState {
    backend: Arc<BackendClient>,
}

impl AppState {
    pub fn new(backend: BackendClient) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }
}

pub fn build_router(state: AppState, permissive_cors: bool) -> Router {
    let app = Router::new()
        .route("/metrics", get(metrics))
        .merge(quiz_router(state.clone()))
        .merge(backend_router(state))
        .fallback(|| async {
            tracing::info!("Fallback");
            StatusCode::NOT_FOUND
        });
    let app = if permissive_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };
    app.layer(TraceLayer::new_for_http())
}

pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let addr = settings.server.address();
    if settings.backend.url.is_none() {
        tracing::warn!("Backend URL is not configured, quiz generation will fail");
    }
    let backend =
        BackendClient::new(&settings.backend).context("Failed to build backend HTTP client")?;
    let app = build_router(AppState::new(backend), settings.server.permissive_cors);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Serving on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metrics = prometheus::gather();
    let mut buf = vec![];
    if let Err(e) = encoder.encode(&metrics, &mut buf) {
        tracing::error!("Failed to encode metrics: {e}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    (
        [(header::CONTENT_TYPE, encoder.format_type().to_owned())],
        buf,
    )
        .into_response()
}
