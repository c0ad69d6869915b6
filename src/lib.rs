//! Item service: REST CRUD for items over an in-memory or PostgreSQL store.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod model;
pub mod openapi;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::{Settings, StorageBackend};
pub use error::{AppError, ConfigError};
pub use model::{Item, ItemCreate, ItemUpdate};
pub use response::Page;
pub use routes::{common_routes, item_routes};
pub use state::AppState;
pub use store::{ItemStore, MemoryItemStore, PgItemStore};

use axum::{
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(item_routes(state))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(middleware::map_response(body_limit_envelope))
}

/// The body limit layer answers oversized requests with plain text before any
/// extractor runs; rewrite that answer into the JSON error envelope.
async fn body_limit_envelope(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE || is_json {
        return response;
    }
    AppError::PayloadTooLarge(format!(
        "request body exceeds the {} byte limit",
        MAX_BODY_BYTES
    ))
    .into_response()
}

/// Construct the store selected by `settings.storage`.
pub async fn build_store(settings: &Settings) -> Result<Arc<dyn ItemStore>, AppError> {
    Ok(match settings.storage {
        StorageBackend::Memory => Arc::new(MemoryItemStore::new()),
        StorageBackend::Postgres => Arc::new(PgItemStore::connect(&settings.database).await?),
    })
}
