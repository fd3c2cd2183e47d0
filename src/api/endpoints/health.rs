//! Liveness and readiness endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ReadinessResponse, StatusResponse};

/// `GET /`: liveness. Never touches the generator.
pub async fn root(State(ctx): State<ApiContext>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        model: ctx.core.generator().model().to_string(),
        version: crate::config::APP_VERSION.to_string(),
    })
}

/// `GET /ready`: 200 when the model is installed and reachable, 503
/// otherwise.
pub async fn ready(
    State(ctx): State<ApiContext>,
) -> Result<(StatusCode, Json<ReadinessResponse>), ApiError> {
    let core = ctx.core.clone();
    let probe = tokio::task::spawn_blocking(move || core.generator().is_ready()).await?;

    let ready = match probe {
        Ok(ready) => ready,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness probe failed");
            false
        }
    };

    let generator = ctx.core.generator();
    let body = ReadinessResponse {
        status: if ready { "ready" } else { "unavailable" }.to_string(),
        model: generator.model().to_string(),
        backend: generator.backend().to_string(),
    };
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    Ok((status, Json(body)))
}
