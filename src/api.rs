use crate::SharedData;
use crate::app_env::AppConfig;
use crate::logging;
use axum::Router;
use axum::http::HeaderValue;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub mod health;
pub mod swagger_main;
#[cfg(test)]
pub mod test_util;
pub mod todo;
pub mod user;

/// Assembles every route in the application: resource routes under the configured prefix,
/// the health check, and API documentation
pub fn build_router(config: &AppConfig, shared_data: Arc<SharedData>) -> Router {
    let resource_routes = Router::new()
        .nest("/users", user::user_routes().merge(todo::todo_routes()));

    let router = Router::new()
        .nest(&config.api_prefix, resource_routes)
        .merge(health::health_routes())
        .with_state(shared_data)
        .merge(swagger_main::build_documentation(&config.api_prefix))
        .layer(cors_layer(&config.cors_origins));

    logging::attach_tracing_http(router)
}

/// Allows any origin when `*` is configured, otherwise only the listed origins
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed_origins = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
