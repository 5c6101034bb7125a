use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::{
    error::QuizError,
    inference::{BackendClient, ModelProfile},
    quiz::{Difficulty, Quiz, QuizRequest},
    server::{app::AppState, deserializers::deserialize_non_blank_string},
    telemetry::QUIZ_REQUESTS,
};

use super::ApiResponse;

#[derive(Deserialize)]
struct QuizForm {
    #[serde(default, deserialize_with = "deserialize_non_blank_string")]
    topic: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_blank_string")]
    difficulty: Option<String>,
}

impl TryFrom<QuizForm> for QuizRequest {
    type Error = QuizError;

    fn try_from(form: QuizForm) -> Result<Self, Self::Error> {
        let (Some(topic), Some(difficulty)) = (form.topic, form.difficulty) else {
            return Err(QuizError::Validation(
                "Both topic and difficulty are required".to_owned(),
            ));
        };
        let difficulty: Difficulty = difficulty.parse().map_err(QuizError::Validation)?;
        QuizRequest::new(&topic, difficulty).map_err(QuizError::Validation)
    }
}

async fn generate(
    State(backend): State<Arc<BackendClient>>,
    payload: Result<Json<QuizForm>, JsonRejection>,
) -> ApiResponse<Json<Quiz>> {
    respond(&backend, payload, ModelProfile::Full).await
}

async fn generate_fast(
    State(backend): State<Arc<BackendClient>>,
    payload: Result<Json<QuizForm>, JsonRejection>,
) -> ApiResponse<Json<Quiz>> {
    respond(&backend, payload, ModelProfile::Fast).await
}

async fn respond(
    backend: &BackendClient,
    payload: Result<Json<QuizForm>, JsonRejection>,
    profile: ModelProfile,
) -> ApiResponse<Json<Quiz>> {
    let result = match parse_request(payload) {
        Ok(request) => backend.generate_quiz(&request, profile).await,
        Err(e) => Err(e),
    };
    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    QUIZ_REQUESTS
        .with_label_values(&[profile.as_str(), outcome])
        .inc();
    result.map(Json)
}

fn parse_request(payload: Result<Json<QuizForm>, JsonRejection>) -> ApiResponse<QuizRequest> {
    let Json(form) = payload.map_err(|e| QuizError::Validation(e.body_text()))?;
    form.try_into()
}

pub fn quiz_router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/api/generate-fast", post(generate_fast))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(topic: Option<&str>, difficulty: Option<&str>) -> QuizForm {
        QuizForm {
            topic: topic.map(str::to_owned),
            difficulty: difficulty.map(str::to_owned),
        }
    }

    #[test]
    fn form_converts_to_request() {
        let request = QuizRequest::try_from(form(Some("Oceans"), Some("Easy"))).unwrap();
        assert_eq!(request.topic(), "Oceans");
        assert_eq!(request.difficulty(), Difficulty::Easy);
    }

    #[test]
    fn missing_fields_are_validation_errors() {
        for invalid in [
            form(None, Some("easy")),
            form(Some("Oceans"), None),
            form(Some("Oceans"), Some("impossible")),
        ] {
            assert!(matches!(
                QuizRequest::try_from(invalid),
                Err(QuizError::Validation(_))
            ));
        }
    }
}
