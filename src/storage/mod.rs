//! All things related to the storage of stations

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::stations::Station;
use crate::stations::StationType;

pub use memory::Memory;
pub use postgres::Postgres;

mod memory;
mod postgres;

/// Storage errors
#[derive(Debug, Error)]
pub enum Error {
    /// A connection error with the storage
    #[error("Connection error: {0}")]
    Connection(String),

    /// The name of the station is already taken by another station that is not deleted
    #[error("Unique violation: {0}")]
    UniqueViolation(String),
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Values to create a Station
pub struct CreateStationValues<'a> {
    /// The name of the station, already trimmed
    pub name: &'a str,

    /// The location of the station, already trimmed
    pub location: &'a str,

    /// The type of the station
    pub station_type: StationType,
}

/// Values to update a Station
///
/// Only provided values are applied, the other fields are not touched
#[derive(Default)]
pub struct UpdateStationValues<'a> {
    /// New name of the station, already trimmed
    pub name: Option<&'a str>,

    /// New location of the station, already trimmed
    pub location: Option<&'a str>,

    /// New type of the station
    pub station_type: Option<StationType>,

    /// New active state of the station
    pub is_active: Option<bool>,
}

/// Filters for listing stations, combined with a logical AND
#[derive(Debug, Default)]
pub struct StationFilter {
    /// Case-insensitive substring of the name
    pub name: Option<String>,

    /// Exact active state
    pub is_active: Option<bool>,

    /// Exact type
    pub station_type: Option<StationType>,
}

impl StationFilter {
    /// Does the station pass all filters?
    ///
    /// Does not look at the soft-delete, that is up to the caller
    pub fn matches(&self, station: &Station) -> bool {
        let name_matches = self.name.as_ref().is_none_or(|name| {
            station
                .name
                .to_lowercase()
                .contains(&name.to_lowercase())
        });

        let is_active_matches = self
            .is_active
            .is_none_or(|is_active| station.is_active == is_active);

        let type_matches = self
            .station_type
            .is_none_or(|station_type| station.station_type == station_type);

        name_matches && is_active_matches && type_matches
    }
}

/// Storage with all supported operations
///
/// Timestamps are stamped by the storage: `created_at` on creation, `updated_at` on every update
/// and `deleted_at` on the soft-delete
#[async_trait]
pub trait Storage: Clone + Send + Sync + 'static {
    /// Short name of the storage, for diagnostics
    fn name(&self) -> &'static str;

    /// Find all stations passing the filter, ordered by name
    ///
    /// Respects the soft-delete. The order of names with non-ASCII characters depends on the
    /// storage: the memory storage compares the lowercased names by code point, Postgres uses the
    /// collation of the database.
    async fn find_all_stations(&self, filter: &StationFilter) -> Result<Vec<Station>>;

    /// Find a single station by its name, case-insensitive
    ///
    /// Respects the soft-delete
    async fn find_single_station_by_name(&self, name: &str) -> Result<Option<Station>>;

    /// Find a single station by ID
    ///
    /// Respects the soft-delete
    async fn find_single_station_by_id(&self, id: &Uuid) -> Result<Option<Station>>;

    /// Find a single station by ID (unchecked)
    ///
    /// DOES NOT respect the soft-delete, handle with care
    async fn find_single_station_by_id_unchecked(&self, id: &Uuid) -> Result<Option<Station>>;

    /// Does the station exist?
    ///
    /// Respects the soft-delete
    async fn station_exists(&self, id: &Uuid) -> Result<bool>;

    /// Create a station
    async fn create_station(&self, values: &CreateStationValues<'_>) -> Result<Station>;

    /// Update a single station
    ///
    /// Gives `None` when the station got deleted in the meantime
    async fn update_station(
        &self,
        station: &Station,
        values: &UpdateStationValues<'_>,
    ) -> Result<Option<Station>>;

    /// Soft-delete a station, marking it as inactive
    ///
    /// Gives `false` when the station was already deleted
    async fn delete_station(&self, station: &Station) -> Result<bool>;
}
