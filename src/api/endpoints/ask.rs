//! Question answering endpoint.

use axum::extract::State;
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AskRequest};
use crate::pipeline::response::MedicalResponse;

/// `POST /ask`: run one question through the safety-gated pipeline.
///
/// The pipeline blocks on the generator, so it runs on the blocking pool.
pub async fn ask(
    State(ctx): State<ApiContext>,
    Json(req): Json<AskRequest>,
) -> Result<Json<MedicalResponse>, ApiError> {
    let question = req.question.trim().to_string();
    if question.is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".into()));
    }

    let limit = ctx.core.config().server.max_question_chars;
    if question.chars().count() > limit {
        return Err(ApiError::BadRequest(format!(
            "question exceeds {limit} characters"
        )));
    }

    let request_id = Uuid::new_v4();
    let core = ctx.core.clone();
    let response =
        tokio::task::spawn_blocking(move || core.pipeline().answer(request_id, &question))
            .await??;

    Ok(Json(response))
}
