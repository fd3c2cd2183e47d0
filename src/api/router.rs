//! HTTP router.
//!
//! Routes:
//! - `GET /` liveness
//! - `GET /ready` generator readiness
//! - `POST /ask` safety-gated question answering
//!
//! Every route passes through the access log. `/ask` responses are marked
//! `Cache-Control: no-store`.

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the service router over shared core state.
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    let ask = post(endpoints::ask::ask).layer(SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    ));

    Router::new()
        .route("/", get(endpoints::health::root))
        .route("/ready", get(endpoints::health::ready))
        .route("/ask", ask)
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
}
