//! API v0 endpoints.
//!
//! Version 0 signals an unstable API -- breaking changes are expected
//! until the daemon reaches 1.0.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::server::SharedState;
use crate::api_client::types::StatsSnapshot;
use crate::availability::Reading;
use crate::tracing::prelude::*;

/// Build the v0 API routes with OpenAPI metadata.
pub fn routes() -> OpenApiRouter<SharedState> {
    OpenApiRouter::new()
        .routes(routes!(health))
        .routes(routes!(post_reading))
        .routes(routes!(get_stats))
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = OK, description = "Server is running", body = String),
    ),
)]
async fn health() -> &'static str {
    "OK"
}

/// Ingest one device-status reading.
///
/// Accepts an arbitrary JSON object; the daemon stamps it with the
/// receipt time and returns the stamped reading. No schema validation
/// beyond requiring an object.
#[utoipa::path(
    post,
    path = "/readings",
    tag = "readings",
    responses(
        (status = OK, description = "Stamped reading as persisted"),
        (status = BAD_REQUEST, description = "Payload is not a JSON object"),
        (status = INTERNAL_SERVER_ERROR, description = "Reading could not be persisted"),
    ),
)]
async fn post_reading(
    State(state): State<SharedState>,
    Json(payload): Json<Value>,
) -> Result<Json<Reading>, StatusCode> {
    let Value::Object(fields) = payload else {
        warn!("Rejecting non-object reading payload");
        return Err(StatusCode::BAD_REQUEST);
    };

    state
        .monitor
        .apply_reading(fields)
        .await
        .map(Json)
        .map_err(|e| {
            error!(error = %e, "Failed to persist reading");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

/// Return the cumulative availability stats.
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = OK, description = "Cumulative availability snapshot", body = StatsSnapshot),
        (status = INTERNAL_SERVER_ERROR, description = "Monitor unavailable"),
    ),
)]
async fn get_stats(State(state): State<SharedState>) -> Result<Json<StatsSnapshot>, StatusCode> {
    state
        .monitor
        .stats()
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
