// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::application::forecast_service::ForecastService;
use crate::infrastructure::config::load_service_config;
use crate::infrastructure::document_store::DocumentStoreRepository;
use crate::infrastructure::model_store::ModelStore;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{forecast, health_check, train};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_service_config()?;

    // Document store (infrastructure layer). Unreachable at startup is a
    // warning only; individual queries surface their own errors.
    let repository = Arc::new(DocumentStoreRepository::new(config.document_store.clone()));
    match repository.ping().await {
        Ok(()) => tracing::info!("connected to document store"),
        Err(e) => tracing::warn!(error = %e, "document store unreachable at startup"),
    }

    let store = ModelStore::new(&config.models.dir);
    let forecast_service = ForecastService::new(repository, store);
    let state = Arc::new(AppState { forecast_service });

    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/train", post(train))
        .route("/forecast", post(forecast))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config.http.bind.parse()?;
    tracing::info!(%addr, "starting aqi-forecast service");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
