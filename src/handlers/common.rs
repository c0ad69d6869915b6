//! Root, liveness, readiness, and version handlers.

use crate::openapi::ApiDoc;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::time::Duration;
use utoipa::{OpenApi, ToSchema};

/// Delay of the simulated external dependency check.
pub const EXTERNAL_PROBE_DELAY: Duration = Duration::from_millis(100);

#[derive(Serialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct HealthBody {
    pub status: String,
    pub external_service: String,
    pub uptime_seconds: u64,
}

#[derive(Serialize, ToSchema)]
pub struct ReadyBody {
    pub status: String,
    pub storage: String,
}

#[derive(Serialize, ToSchema)]
pub struct VersionBody {
    pub name: String,
    pub version: String,
    pub environment: String,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "root",
    responses((status = 200, description = "Welcome message", body = MessageBody))
)]
pub async fn root() -> Json<MessageBody> {
    Json(MessageBody {
        message: format!("Hello from {}!", env!("CARGO_PKG_NAME")),
    })
}

/// Stand-in for a real dependency probe.
pub async fn check_external_service() -> bool {
    tokio::time::sleep(EXTERNAL_PROBE_DELAY).await;
    true
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "root",
    responses((status = 200, description = "Service status", body = HealthBody))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    let external_service = if check_external_service().await {
        "healthy"
    } else {
        "unhealthy"
    };
    Json(HealthBody {
        status: "ok".into(),
        external_service: external_service.into(),
        uptime_seconds: state.uptime().as_secs(),
    })
}

#[utoipa::path(
    get,
    path = "/ready",
    tag = "root",
    responses(
        (status = 200, description = "Storage reachable", body = ReadyBody),
        (status = 503, description = "Storage unreachable", body = ReadyBody),
    )
)]
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadyBody>, (StatusCode, Json<ReadyBody>)> {
    let storage = state.store.backend();
    if let Err(e) = state.store.ping().await {
        tracing::warn!(storage, error = %e, "readiness check failed");
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyBody {
                status: "degraded".into(),
                storage: storage.into(),
            }),
        ));
    }
    Ok(Json(ReadyBody {
        status: "ok".into(),
        storage: storage.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/version",
    tag = "root",
    responses((status = 200, description = "Service name and version", body = VersionBody))
)]
pub async fn version(State(state): State<AppState>) -> Json<VersionBody> {
    Json(VersionBody {
        name: env!("CARGO_PKG_NAME").into(),
        version: state.settings.version.clone(),
        environment: state.settings.environment.clone(),
    })
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
