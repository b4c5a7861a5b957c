use crate::SharedData;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(health_check))]
/// Defines the OpenAPI documentation for the health check
pub struct HealthApi;
/// Constant used to group the health check in OpenAPI documentation
pub const HEALTH_API_GROUP: &str = "Health";

pub fn health_routes() -> Router<Arc<SharedData>> {
    Router::new().route("/health", get(health_check))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = HEALTH_API_GROUP,
    responses(
        (status = 200, description = "The service is up", body = String, example = json!("Healthy")),
    ),
)]
#[tracing::instrument(ret, level = "debug")]
/// Liveness probe
async fn health_check() -> &'static str {
    "Healthy"
}
