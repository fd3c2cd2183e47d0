//! HTTP service layer.
//!
//! Exposes the answer pipeline over axum. The router is composable:
//! `api_router()` returns a `Router` that can be mounted on any axum
//! server, and `start_api_server()` runs it with graceful shutdown.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer, ApiSession, ServerError};
pub use types::ApiContext;
