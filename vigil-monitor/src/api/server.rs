//! API server assembly.

use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::Result;
use crate::monitor::MonitorHandle;
use crate::tracing::prelude::*;

/// State shared by all API handlers.
#[derive(Clone)]
pub struct SharedState {
    pub monitor: MonitorHandle,
}

#[derive(OpenApi)]
#[openapi(info(
    title = "vigil-monitor API",
    description = "Device availability ingestion and accounting"
))]
struct ApiDoc;

/// Build the application router with Swagger UI mounted at `/docs`.
pub fn router(monitor: MonitorHandle) -> Router {
    let state = SharedState { monitor };

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/v0", super::v0::routes())
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", api))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until shutdown.
pub async fn serve(
    port: u16,
    monitor: MonitorHandle,
    shutdown: tokio_util::sync::CancellationToken,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "API listening");

    axum::serve(listener, router(monitor))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    Ok(())
}
