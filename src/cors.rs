//! Cross-origin requests

use std::time::Duration;

use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::header::ACCEPT;
use axum::http::header::CONTENT_TYPE;
use axum::http::header::ORIGIN;
use tower_http::cors::CorsLayer;

/// How long browsers may cache a preflight response
const MAX_AGE: Duration = Duration::from_secs(3600);

/// CORS layer allowing the given origins
///
/// Origins that are not valid header values are skipped with a warning
pub fn layer(origins: &[String]) -> CorsLayer {
    let origins = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!(r#"Ignoring invalid CORS origin "{origin}""#);
                None
            }
        })
        .collect::<Vec<HeaderValue>>();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::HEAD,
            Method::OPTIONS,
        ])
        .allow_headers([ACCEPT, CONTENT_TYPE, ORIGIN])
        .allow_credentials(true)
        .max_age(MAX_AGE)
}
