use crate::app_env::AppConfig;
use anyhow::Context;
use axum::extract::State;
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;

mod api;
mod app_env;
mod db;
mod domain;
mod dto;
mod external_connections;
mod logging;
mod persistence;
mod routing_utils;

/// Application state handed to every route
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
}

/// Extractor for the shared application state
pub type AppState = State<Arc<SharedData>>;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();
    let config = AppConfig::from_env().context("reading configuration")?;

    let otel_exporters = match (&config.otel_span_export_url, &config.otel_metric_export_url) {
        (Some(span_url), Some(metric_url)) => Some(logging::init_exporters(span_url, metric_url)?),
        (Some(otlp_url), None) | (None, Some(otlp_url)) => {
            Some(logging::init_exporters(otlp_url, otlp_url)?)
        }
        (None, None) => None,
    };
    logging::setup_logging_and_tracing(logging::init_env_filter()?, otel_exporters);

    let pool = db::connect_sqlx(&config.database_url, config.db_max_connections).await?;
    db::ensure_schema(&pool).await?;

    let shared_data = Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(pool),
    });
    let router = api::build_router(&config, shared_data);

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("binding to {}", config.bind_address()))?;
    info!(
        "Starting server on {} with routes under {}",
        config.bind_address(),
        config.api_prefix
    );

    axum::serve(listener, router)
        .await
        .context("running the HTTP server")?;

    Ok(())
}
