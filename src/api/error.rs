//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::PipelineError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                detail.clone(),
            ),
            ApiError::GenerationUnavailable(detail) => {
                tracing::warn!(detail, "Generation backend unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "GENERATION_UNAVAILABLE",
                    "The answer service is temporarily unavailable. Please try again later."
                        .to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Generation(e) => ApiError::GenerationUnavailable(e.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("pipeline task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::generation::GenerationError;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn bad_request_returns_400_with_detail() {
        let response = ApiError::BadRequest("question must not be empty".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert_eq!(json["error"]["message"], "question must not be empty");
    }

    #[tokio::test]
    async fn generation_unavailable_hides_upstream_detail() {
        let response =
            ApiError::GenerationUnavailable("connection refused at 10.0.0.5".into()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "GENERATION_UNAVAILABLE");
        assert!(!json["error"]["message"].as_str().unwrap().contains("10.0.0.5"));
    }

    #[tokio::test]
    async fn internal_returns_500_generic_message() {
        let response = ApiError::Internal("secret stack trace".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INTERNAL");
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[test]
    fn pipeline_error_maps_to_unavailable() {
        let err: ApiError =
            PipelineError::Generation(GenerationError::Timeout(300)).into();
        assert!(matches!(err, ApiError::GenerationUnavailable(_)));
    }

    #[tokio::test]
    async fn join_error_maps_to_internal() {
        let join_err = tokio::spawn(async { panic!("boom") }).await.unwrap_err();
        let err: ApiError = join_err.into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
