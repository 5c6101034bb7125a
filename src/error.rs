use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::quiz::{QuizFormatError, QuizQuestion};

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("{0}")]
    Validation(String),
    #[error("backend is not configured: {0}")]
    Configuration(String),
    #[error("backend is unreachable: {0}")]
    BackendUnavailable(#[source] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Backend { status: u16, body: String },
    #[error("invalid quiz format received from model response: {0}")]
    InvalidQuizFormat(#[from] QuizFormatError),
}

impl QuizError {
    pub fn status(&self) -> StatusCode {
        match self {
            QuizError::Validation(_) => StatusCode::BAD_REQUEST,
            QuizError::Configuration(_)
            | QuizError::BackendUnavailable(_)
            | QuizError::Backend { .. }
            | QuizError::InvalidQuizFormat(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for the `outcome` metric.
    pub fn kind(&self) -> &'static str {
        match self {
            QuizError::Validation(_) => "invalid_request",
            QuizError::Configuration(_) => "unconfigured",
            QuizError::BackendUnavailable(_) => "unavailable",
            QuizError::Backend { .. } => "backend_error",
            QuizError::InvalidQuizFormat(_) => "invalid_format",
        }
    }
}

// `quiz` is always present on server errors so clients can render an empty list
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Vec<QuizQuestion>>,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for QuizError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            QuizError::Validation(details) => {
                tracing::info!("Rejected quiz request: {details}");
                ErrorBody {
                    quiz: None,
                    error: "Missing topic or difficulty parameter".to_owned(),
                    details: Some(details),
                }
            }
            error => {
                tracing::error!("Quiz generation failed: {error}");
                ErrorBody {
                    quiz: Some(vec![]),
                    error: "Failed to generate quiz".to_owned(),
                    details: Some(error.to_string()),
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(
            QuizError::Validation("topic".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            QuizError::Configuration("no url".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            QuizError::from(QuizFormatError::NoJsonObject).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn server_error_body_carries_empty_quiz() {
        let body = ErrorBody {
            quiz: Some(vec![]),
            error: "Failed to generate quiz".to_owned(),
            details: Some(
                QuizError::Backend {
                    status: 503,
                    body: "model loading".into(),
                }
                .to_string(),
            ),
        };
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["quiz"], serde_json::json!([]));
        assert_eq!(json["details"], "backend returned 503: model loading");
    }

    #[test]
    fn validation_body_has_no_quiz() {
        let body = ErrorBody {
            quiz: None,
            error: "Missing topic or difficulty parameter".to_owned(),
            details: None,
        };
        let json = serde_json::to_value(body).unwrap();
        assert!(json.get("quiz").is_none());
        assert!(json.get("details").is_none());
    }
}
