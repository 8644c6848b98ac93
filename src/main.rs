#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

use std::any::Any;

use anyhow::Result;
use axum::Extension;
use axum::Router;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::api::fallback;
use crate::api::router;
use crate::config::Config;
use crate::info::ServiceInfo;
use crate::seed::ensure_initial_stations;
use crate::service::StationService;
use crate::storage::Memory;
use crate::storage::Postgres;
use crate::storage::Storage;

mod api;
mod config;
mod cors;
mod graceful_shutdown;
mod info;
mod seed;
mod service;
mod stations;
mod storage;
#[cfg(test)]
mod tests;
mod utils;

const DEFAULT_RUST_LOG: &str = "stations=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let config = Config::from_env()?;

    let shutdown = CancellationToken::new();
    tokio::spawn(graceful_shutdown::handler(shutdown.clone()));

    if let Some(database_url) = &config.database_url {
        let storage = Postgres::connect(database_url, config.max_connections).await?;

        serve(storage, &config, shutdown).await
    } else {
        tracing::info!("`DATABASE_URL` is not set, using memory storage");

        serve(Memory::new(), &config, shutdown).await
    }
}

/// Serve the app on the configured address until shutdown
async fn serve<S: Storage>(storage: S, config: &Config, shutdown: CancellationToken) -> Result<()> {
    let app = setup_app(storage, config).await?;

    let listener = TcpListener::bind(config.address).await?;
    tracing::info!(
        "Listening on {} ({} environment)",
        config.address,
        config.environment
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    Ok(())
}

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` if seeding the initial stations fails
pub async fn setup_app<S: Storage>(storage: S, config: &Config) -> Result<Router> {
    let service = StationService::new(storage);

    if config.seed_stations {
        ensure_initial_stations(&service).await?;
    }

    Ok(create_router(service, config))
}

/// Create the router for the stations service
fn create_router<S: Storage>(service: StationService<S>, config: &Config) -> Router {
    let service_info = ServiceInfo {
        environment: config.environment.clone(),
        database: service.storage().name(),
    };

    Router::new()
        .nest("/api", router::<S>())
        .route("/info", get(info::info))
        .fallback(fallback)
        .layer(Extension(service))
        .layer(Extension(service_info))
        .layer(cors::layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
}

/// Turn a panic in a handler into a generic `500 Internal Server Error`
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    tracing::error!("Handler panicked: {details}");

    api::Error::internal_server_error().into_response()
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}
