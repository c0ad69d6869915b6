//! Common routes: root, health, readiness, version, API document.

use crate::handlers::common::{health, openapi_json, ready, root, version};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .route("/openapi.json", get(openapi_json))
        .with_state(state)
}
