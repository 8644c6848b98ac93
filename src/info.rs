//! Information about the running service

use axum::Extension;
use chrono::NaiveDateTime;
use chrono::Utc;
use serde::Serialize;

use crate::api::Success;

/// Static information about the running service
#[derive(Clone, Debug)]
pub struct ServiceInfo {
    /// Name of the environment
    pub environment: String,

    /// Name of the storage in use
    pub database: &'static str,
}

/// Information response going to the user
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    service: &'static str,
    version: &'static str,
    environment: String,
    database: &'static str,
    timestamp: NaiveDateTime,
}

/// Information about the service
///
/// Request:
/// ```sh
/// curl -v http://localhost:6000/info
/// ```
///
/// Response:
/// ```json
/// { "data": { "service": "stations", "version": "0.1.0", "database": "memory" ... } }
/// ```
pub async fn info(Extension(info): Extension<ServiceInfo>) -> Success<InfoResponse> {
    Success::ok(InfoResponse {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        environment: info.environment,
        database: info.database,
        timestamp: Utc::now().naive_utc(),
    })
}
