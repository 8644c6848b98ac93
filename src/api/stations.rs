//! Stations API endpoints
//!
//! Everything related to the stations management

use std::borrow::Cow;

use axum::Extension;
use axum::extract::Path;
use axum::http::StatusCode;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;
use validator::ValidationError;

use crate::service::DeleteOutcome;
use crate::service::StationPatch;
use crate::service::StationService;
use crate::stations::Station;
use crate::stations::StationSummary;
use crate::stations::StationType;
use crate::storage::StationFilter;
use crate::storage::Storage;

use super::Error;
use super::Form;
use super::PathParameters;
use super::QueryParameters;
use super::Success;
use super::parse_station_id;

/// Station response going to the user
///
/// Basically filtering which fields are shown to the user
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationResponse {
    /// Station ID
    pub id: Uuid,

    /// Name of the station
    pub name: String,

    /// Location of the station
    pub location: String,

    /// Label of the station type
    #[serde(rename = "type")]
    pub station_type: &'static str,

    /// Is the station in service?
    pub is_active: bool,

    /// Creation date
    pub created_at: NaiveDateTime,

    /// Last updated at
    pub updated_at: Option<NaiveDateTime>,
}

impl StationResponse {
    /// Create a response from a [`Station`](Station)
    fn from_station(station: Station) -> Self {
        Self {
            id: station.id,
            name: station.name,
            location: station.location,
            station_type: station.station_type.label(),
            is_active: station.is_active,
            created_at: station.created_at,
            updated_at: station.updated_at,
        }
    }
}

/// Confirmation of a delete
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    message: &'static str,
}

/// Query filters for listing stations
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Case-insensitive part of the name
    name: Option<String>,

    /// Older name of the `name` filter, `name` wins when both are given
    name_filter: Option<String>,

    /// Only active or only inactive stations
    is_active: Option<bool>,

    /// Only stations of this type
    #[serde(rename = "type")]
    station_type: Option<StationType>,
}

/// List all stations, optionally filtered
///
/// Request:
/// ```sh
/// curl -v 'http://localhost:6000/api/stations?name=central&isActive=true&type=Origin'
/// ```
///
/// Response:
/// ```json
/// { "data": [ { "id": "<uuid>", "name": "Central", "type": "Origin", "status": "Active" ... } ] }
/// ```
pub async fn list<S: Storage>(
    Extension(service): Extension<StationService<S>>,
    QueryParameters(query): QueryParameters<ListQuery>,
) -> Result<Success<Vec<StationSummary>>, Error> {
    tracing::debug!(
        "Listing stations, name: {:?}, name filter: {:?}, is active: {:?}, type: {:?}",
        query.name,
        query.name_filter,
        query.is_active,
        query.station_type
    );

    let name = query
        .name
        .filter(|name| !name.trim().is_empty())
        .or(query.name_filter);

    let filter = StationFilter {
        name,
        is_active: query.is_active,
        station_type: query.station_type,
    };

    let stations = service.list(filter).await?;

    Ok(Success::ok(stations))
}

/// Get a single station
///
/// Request:
/// ```sh
/// curl -v http://localhost:6000/api/stations/<uuid>
/// ```
///
/// Response:
/// ```json
/// { "data": { "id": "<uuid>", "name": "Central" ... } }
/// ```
pub async fn single<S: Storage>(
    Extension(service): Extension<StationService<S>>,
    PathParameters(station_id): PathParameters<Uuid>,
) -> Result<Success<StationResponse>, Error> {
    let station_id = parse_station_id(station_id)?;

    match service.get_by_id(&station_id).await? {
        Some(station) => Ok(Success::ok(StationResponse::from_station(station))),
        None => {
            tracing::warn!("Station not found: {station_id}");

            Err(Error::not_found("Station not found"))
        }
    }
}

const MAX_NAME_LENGTH: usize = 100;

const MAX_LOCATION_LENGTH: usize = 255;

/// Check the trimmed value, the way it will be stored
///
/// Blank values fail with `required` when given, otherwise they pass (they are ignored later on)
fn check_trimmed(
    value: &str,
    required: Option<&'static str>,
    max_length: usize,
    too_long: &'static str,
) -> Result<(), ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return match required {
            Some(message) => Err(ValidationError::new("blank").with_message(Cow::from(message))),
            None => Ok(()),
        };
    }

    if value.chars().count() > max_length {
        return Err(ValidationError::new("length").with_message(Cow::from(too_long)));
    }

    Ok(())
}

fn required_name(value: &str) -> Result<(), ValidationError> {
    check_trimmed(
        value,
        Some("Name is required"),
        MAX_NAME_LENGTH,
        "Name can not be longer than 100 characters",
    )
}

fn required_location(value: &str) -> Result<(), ValidationError> {
    check_trimmed(
        value,
        Some("Location is required"),
        MAX_LOCATION_LENGTH,
        "Location can not be longer than 255 characters",
    )
}

fn optional_name(value: &str) -> Result<(), ValidationError> {
    check_trimmed(
        value,
        None,
        MAX_NAME_LENGTH,
        "Name can not be longer than 100 characters",
    )
}

fn optional_location(value: &str) -> Result<(), ValidationError> {
    check_trimmed(
        value,
        None,
        MAX_LOCATION_LENGTH,
        "Location can not be longer than 255 characters",
    )
}

/// Create station form
///
/// Fields to create a station with, name and location are trimmed before the length checks
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStationForm {
    /// Name of the station, unique among the stations that are not deleted
    #[validate(custom(function = "required_name"))]
    name: String,

    /// Location of the station
    #[validate(custom(function = "required_location"))]
    location: String,

    /// Type of the station
    #[serde(rename = "type")]
    station_type: StationType,
}

/// Create a station based on the [`CreateStationForm`](CreateStationForm) form
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "name": "Central", "location": "Main St", "type": "Origin" }' \
///     http://localhost:6000/api/stations
/// ```
///
/// Response
/// ```json
/// { "data": { "id": "<uuid>", "name": "Central" ... } }
/// ```
pub async fn create<S: Storage>(
    Extension(service): Extension<StationService<S>>,
    Form(form): Form<CreateStationForm>,
) -> Result<Success<StationResponse>, Error> {
    form.validate().map_err(|err| Error::validation(&err))?;

    let station = service
        .create(&form.name, &form.location, form.station_type)
        .await
        .inspect_err(|err| tracing::warn!("Could not create station: {err}"))?;

    tracing::info!(
        r#"Station created: {} - "{}""#,
        station.id,
        station.name
    );

    Ok(Success::created(StationResponse::from_station(station)))
}

/// Update station form
///
/// Fields to update a station with, all fields are optional and are not touched when not
/// provided. Blank names and locations are ignored.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStationForm {
    /// New name of the station
    #[validate(custom(function = "optional_name"))]
    name: Option<String>,

    /// New location of the station
    #[validate(custom(function = "optional_location"))]
    location: Option<String>,

    /// New type of the station
    #[serde(rename = "type")]
    station_type: Option<StationType>,

    /// New active state of the station
    is_active: Option<bool>,
}

/// Update a station based on the [`UpdateStationForm`](UpdateStationForm) form
///
/// Only provided values are processed, the other fields of the station will not be touched
///
/// Request:
/// ```sh
/// curl -v -XPUT -H 'Content-Type: application/json' \
///     -d '{ "name": "Central Hub", "isActive": false }' \
///     http://localhost:6000/api/stations/<uuid>
/// ```
///
/// Response
/// ```json
/// { "data": { "id": "<uuid>", "name": "Central Hub" ... } }
/// ```
pub async fn update<S: Storage>(
    Extension(service): Extension<StationService<S>>,
    PathParameters(station_id): PathParameters<Uuid>,
    Form(form): Form<UpdateStationForm>,
) -> Result<Success<StationResponse>, Error> {
    let station_id = parse_station_id(station_id)?;

    form.validate().map_err(|err| Error::validation(&err))?;

    let patch = StationPatch {
        name: form.name,
        location: form.location,
        station_type: form.station_type,
        is_active: form.is_active,
    };

    let station = service
        .update(&station_id, &patch)
        .await
        .inspect_err(|err| tracing::warn!("Could not update station {station_id}: {err}"))?;

    match station {
        Some(station) => {
            tracing::info!(
                r#"Station updated: {} - "{}""#,
                station.id,
                station.name
            );

            Ok(Success::ok(StationResponse::from_station(station)))
        }
        None => {
            tracing::warn!("Tried to update missing station: {station_id}");

            Err(Error::not_found("Station not found"))
        }
    }
}

/// Soft-delete a station
///
/// Deleted stations are marked inactive and are no longer visible
///
/// Request:
/// ```sh
/// curl -v -XDELETE http://localhost:6000/api/stations/<uuid>
/// ```
pub async fn delete<S: Storage>(
    Extension(service): Extension<StationService<S>>,
    PathParameters(station_id): PathParameters<Uuid>,
) -> Result<Success<DeleteResponse>, Error> {
    let station_id = parse_station_id(station_id)?;

    match service.delete_with_outcome(&station_id).await? {
        DeleteOutcome::Deleted => {
            tracing::info!("Station deleted: {station_id}");

            Ok(Success::ok(DeleteResponse {
                message: "Station deleted",
            }))
        }
        DeleteOutcome::AlreadyDeleted => {
            tracing::warn!("Tried to delete deleted station: {station_id}");

            Err(Error::not_found("Station not found").with_description("Station is already deleted"))
        }
        DeleteOutcome::NotFound => {
            tracing::warn!("Tried to delete missing station: {station_id}");

            Err(Error::not_found("Station not found"))
        }
    }
}

/// Check if a station exists, without a body
///
/// Malformed IDs never exist
///
/// Request:
/// ```sh
/// curl -v -I http://localhost:6000/api/stations/<uuid>
/// ```
pub async fn exists<S: Storage>(
    Extension(service): Extension<StationService<S>>,
    station_id: Result<Path<Uuid>, axum::extract::rejection::PathRejection>,
) -> StatusCode {
    let Ok(Path(station_id)) = station_id else {
        return StatusCode::NOT_FOUND;
    };

    match service.exists_by_id(&station_id).await {
        Ok(true) => StatusCode::OK,
        Ok(false) => StatusCode::NOT_FOUND,
        Err(err) => {
            tracing::error!("Could not check existence of station {station_id}: {err}");

            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_trimmed() {
        let padded = format!("  {}  ", "n".repeat(MAX_NAME_LENGTH));
        assert!(required_name(&padded).is_ok());
        assert!(optional_name(&padded).is_ok());

        let too_long = "n".repeat(MAX_NAME_LENGTH + 1);
        assert!(required_name(&too_long).is_err());
        assert!(optional_name(&too_long).is_err());

        // multi-byte characters count as one
        assert!(required_location(&"ó".repeat(MAX_LOCATION_LENGTH)).is_ok());

        let blank = " ".repeat(120);
        let err = required_name(&blank).unwrap_err();
        assert_eq!(Some(Cow::from("Name is required")), err.message);
        assert!(optional_name(&blank).is_ok());
        assert!(optional_location(&blank).is_ok());
    }
}
