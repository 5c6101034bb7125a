use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::{error::ErrorBody, inference::BackendClient, server::app::AppState};

// proxies the backend's model list so deployments can check connectivity
async fn backend_status(State(backend): State<Arc<BackendClient>>) -> Response {
    match backend.list_models().await {
        Ok(models) => Json(models).into_response(),
        Err(e) => {
            tracing::warn!("Backend status check failed: {e}");
            let body = ErrorBody {
                quiz: None,
                error: "Backend connection failed!".to_owned(),
                details: Some(e.to_string()),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

pub fn backend_router(state: AppState) -> Router {
    Router::new()
        .route("/api/backend-status", get(backend_status))
        .with_state(state)
}
