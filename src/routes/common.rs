//! Common routes: health, readiness, version.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    service: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    storage: &'static str,
}

/// Static liveness payload; never touches storage.
async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "healthy",
        service: "product-api",
    })
}

async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyBody>) {
    match state.service.ready().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadyBody {
                status: "ok",
                storage: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyBody {
                    status: "degraded",
                    storage: "unavailable",
                }),
            )
        }
    }
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /health, GET /ready, GET /version.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
