//! All API endpoint setup

use axum::Router;
use axum::routing::get;

use crate::storage::Storage;

pub use request::Form;
pub use request::PathParameters;
pub use request::QueryParameters;
pub use request::parse_station_id;
pub use response::Error;
pub use response::Success;

mod request;
mod response;
mod stations;

/// Get the Axum router for all API routes
pub fn router<S: Storage>() -> Router {
    let stations = Router::new()
        .route("/", get(stations::list::<S>).post(stations::create::<S>))
        .route(
            "/{station}",
            get(stations::single::<S>)
                .head(stations::exists::<S>)
                .put(stations::update::<S>)
                .delete(stations::delete::<S>),
        );

    Router::new().nest("/stations", stations)
}

/// Fallback for all unknown routes
pub async fn fallback() -> Error {
    Error::not_found("Not found")
}
