//! Station service
//!
//! Business rules on top of the storage: name uniqueness, merge-patch updates and the
//! soft-delete lifecycle

use thiserror::Error;
use uuid::Uuid;

use crate::stations::Station;
use crate::stations::StationSummary;
use crate::stations::StationType;
use crate::storage;
use crate::storage::CreateStationValues;
use crate::storage::StationFilter;
use crate::storage::Storage;
use crate::storage::UpdateStationValues;

/// Service errors
#[derive(Debug, Error)]
pub enum Error {
    /// Input that can never be valid
    #[error("{field}: {message}")]
    Validation {
        /// Name of the offending field
        field: &'static str,

        /// What is wrong with it
        message: &'static str,
    },

    /// Another station that is not deleted already has the name
    #[error("{0}")]
    Conflict(String),

    /// Anything the storage could not handle
    #[error(transparent)]
    Storage(storage::Error),
}

impl From<storage::Error> for Error {
    fn from(err: storage::Error) -> Self {
        match err {
            storage::Error::UniqueViolation(_) => Self::Conflict(DUPLICATE_NAME.to_string()),
            err @ storage::Error::Connection(_) => Self::Storage(err),
        }
    }
}

/// Result type for all service interactions
pub type Result<T> = core::result::Result<T, Error>;

const DUPLICATE_NAME: &str = "A station with this name already exists";

const DUPLICATE_NAME_OTHER: &str = "Another station with this name already exists";

/// Partial update of a station
///
/// Every field is independently present or absent, absent fields are left untouched. Blank names
/// and locations count as absent, so they can never be cleared.
#[derive(Debug, Default)]
pub struct StationPatch {
    /// New name
    pub name: Option<String>,

    /// New location
    pub location: Option<String>,

    /// New type
    pub station_type: Option<StationType>,

    /// New active state
    pub is_active: Option<bool>,
}

/// The result of a delete
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeleteOutcome {
    /// The station was active and is now soft-deleted
    Deleted,

    /// The station was soft-deleted before, nothing changed
    AlreadyDeleted,

    /// The station never existed
    NotFound,
}

impl DeleteOutcome {
    /// Was the station deleted by this call?
    #[cfg_attr(not(test), allow(dead_code, reason = "only the boolean `delete` uses it"))]
    pub fn is_deleted(self) -> bool {
        self == Self::Deleted
    }
}

/// Station service, cheap to clone
#[derive(Clone, Debug)]
pub struct StationService<S> {
    /// Where the stations live
    storage: S,
}

impl<S: Storage> StationService<S> {
    /// Create a service on top of the storage
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Create a new, active, station
    ///
    /// Name and location are trimmed, the name must be unique among the stations that are not
    /// deleted
    pub async fn create(
        &self,
        name: &str,
        location: &str,
        station_type: StationType,
    ) -> Result<Station> {
        let name = required(name, "name", "Name is required")?;
        let location = required(location, "location", "Location is required")?;

        if self.name_exists(name, None).await? {
            return Err(Error::Conflict(DUPLICATE_NAME.to_string()));
        }

        let values = CreateStationValues {
            name,
            location,
            station_type,
        };

        let station = self.storage.create_station(&values).await?;

        tracing::debug!(r#"Created station "{}" ({})"#, station.name, station.id);

        Ok(station)
    }

    /// List the summaries of all stations passing the filter, ordered by name
    ///
    /// A blank name filter is no filter
    pub async fn list(&self, filter: StationFilter) -> Result<Vec<StationSummary>> {
        let filter = StationFilter {
            name: filter
                .name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            ..filter
        };

        let stations = self.storage.find_all_stations(&filter).await?;

        Ok(stations
            .into_iter()
            .map(StationSummary::from_station)
            .collect())
    }

    /// Get a single station, `None` when it does not exist or is deleted
    pub async fn get_by_id(&self, id: &Uuid) -> Result<Option<Station>> {
        Ok(self.storage.find_single_station_by_id(id).await?)
    }

    /// Apply a partial update to a station, `None` when it does not exist or is deleted
    ///
    /// `updated_at` is stamped even when nothing changes
    pub async fn update(&self, id: &Uuid, patch: &StationPatch) -> Result<Option<Station>> {
        let Some(station) = self.storage.find_single_station_by_id(id).await? else {
            return Ok(None);
        };

        let name = optional(patch.name.as_deref());
        let location = optional(patch.location.as_deref());

        if let Some(name) = name {
            if name.to_lowercase() != station.name.to_lowercase()
                && self.name_exists(name, Some(&station.id)).await?
            {
                return Err(Error::Conflict(DUPLICATE_NAME_OTHER.to_string()));
            }
        }

        let values = UpdateStationValues {
            name,
            location,
            station_type: patch.station_type,
            is_active: patch.is_active,
        };

        let updated_station = self
            .storage
            .update_station(&station, &values)
            .await
            .map_err(|err| match Error::from(err) {
                Error::Conflict(_) => Error::Conflict(DUPLICATE_NAME_OTHER.to_string()),
                err => err,
            })?;

        if let Some(ref updated_station) = updated_station {
            tracing::debug!(
                r#"Updated station "{}" ({})"#,
                updated_station.name,
                updated_station.id
            );
        }

        Ok(updated_station)
    }

    /// Soft-delete a station
    ///
    /// Gives `true` when the station is deleted by this call, `false` when it never existed or
    /// was deleted before
    #[cfg_attr(
        not(test),
        allow(dead_code, reason = "the API needs `delete_with_outcome` to tell both apart")
    )]
    pub async fn delete(&self, id: &Uuid) -> Result<bool> {
        self.delete_with_outcome(id)
            .await
            .map(DeleteOutcome::is_deleted)
    }

    /// Soft-delete a station, telling apart why nothing was deleted
    ///
    /// The lookup DOES NOT respect the soft-delete, a deleted station is reported as such
    pub async fn delete_with_outcome(&self, id: &Uuid) -> Result<DeleteOutcome> {
        let Some(station) = self.storage.find_single_station_by_id_unchecked(id).await? else {
            return Ok(DeleteOutcome::NotFound);
        };

        if station.is_deleted {
            return Ok(DeleteOutcome::AlreadyDeleted);
        }

        let outcome = if self.storage.delete_station(&station).await? {
            tracing::debug!(r#"Deleted station "{}" ({})"#, station.name, station.id);

            DeleteOutcome::Deleted
        } else {
            // lost a race with another delete
            DeleteOutcome::AlreadyDeleted
        };

        Ok(outcome)
    }

    /// Does the station exist and is it not deleted?
    pub async fn exists_by_id(&self, id: &Uuid) -> Result<bool> {
        Ok(self.storage.station_exists(id).await?)
    }

    /// Is the name (case-insensitive) used by a station that is not deleted?
    ///
    /// The station with `exclude_id` is ignored
    pub async fn name_exists(&self, name: &str, exclude_id: Option<&Uuid>) -> Result<bool> {
        let station = self
            .storage
            .find_single_station_by_name(name.trim())
            .await?;

        Ok(station.is_some_and(|station| Some(&station.id) != exclude_id))
    }
}

/// Trim a required value, blank values are invalid
fn required<'a>(value: &'a str, field: &'static str, message: &'static str) -> Result<&'a str> {
    let value = value.trim();

    if value.is_empty() {
        Err(Error::Validation { field, message })
    } else {
        Ok(value)
    }
}

/// Trim an optional value, blank values are absent
fn optional(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use crate::storage::Memory;

    use super::*;

    fn service() -> StationService<Memory> {
        StationService::new(Memory::new())
    }

    #[tokio::test]
    async fn test_create_trims_and_stamps() {
        let service = service();

        let station = service
            .create("  Central ", " Main St  ", StationType::Origin)
            .await
            .unwrap();

        assert_eq!("Central", station.name);
        assert_eq!("Main St", station.location);
        assert_eq!(StationType::Origin, station.station_type);
        assert!(station.is_active);
        assert!(!station.is_deleted);
        assert!(station.updated_at.is_none());
        assert!(station.deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_create_blank() {
        let service = service();

        let result = service.create("   ", "Main St", StationType::Origin).await;
        assert!(matches!(
            result,
            Err(Error::Validation { field: "name", .. })
        ));

        let result = service.create("Central", "", StationType::Origin).await;
        assert!(matches!(
            result,
            Err(Error::Validation {
                field: "location",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_create_duplicate_name() {
        let service = service();

        let station = service
            .create("Central", "Main St", StationType::Origin)
            .await
            .unwrap();

        let result = service
            .create("CENTRAL", "Other", StationType::Destination)
            .await;
        assert!(matches!(result, Err(Error::Conflict(_))));

        assert!(service.delete(&station.id).await.unwrap());

        let recreated = service
            .create("CENTRAL", "Other", StationType::Destination)
            .await
            .unwrap();
        assert_ne!(station.id, recreated.id);
    }

    #[tokio::test]
    async fn test_name_exists() {
        let service = service();

        let central = service
            .create("Central", "Main St", StationType::Origin)
            .await
            .unwrap();

        assert!(service.name_exists("central", None).await.unwrap());
        assert!(service.name_exists(" CENTRAL ", None).await.unwrap());
        assert!(!service.name_exists("Central Hub", None).await.unwrap());
        assert!(
            !service
                .name_exists("central", Some(&central.id))
                .await
                .unwrap()
        );
        assert!(
            service
                .name_exists("central", Some(&Uuid::new_v4()))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_update_only_is_active() {
        let service = service();

        let station = service
            .create("Central", "Main St", StationType::Origin)
            .await
            .unwrap();

        let patch = StationPatch {
            is_active: Some(false),
            ..StationPatch::default()
        };

        let updated = service.update(&station.id, &patch).await.unwrap().unwrap();

        assert_eq!(station.id, updated.id);
        assert_eq!(station.name, updated.name);
        assert_eq!(station.location, updated.location);
        assert_eq!(station.station_type, updated.station_type);
        assert_eq!(station.created_at, updated.created_at);
        assert!(!updated.is_active);

        let updated_at = updated.updated_at.unwrap();
        assert!(updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn test_update_empty_patch_stamps() {
        let service = service();

        let station = service
            .create("Central", "Main St", StationType::Origin)
            .await
            .unwrap();

        let patch = StationPatch {
            name: Some("   ".to_string()),
            location: Some(String::new()),
            ..StationPatch::default()
        };

        let updated = service.update(&station.id, &patch).await.unwrap().unwrap();

        assert_eq!("Central", updated.name);
        assert_eq!("Main St", updated.location);
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_name() {
        let service = service();

        let central = service
            .create("Central", "Main St", StationType::Origin)
            .await
            .unwrap();
        service
            .create("Harbour", "Quay 1", StationType::Destination)
            .await
            .unwrap();

        // taken by another station
        let patch = StationPatch {
            name: Some("harbour".to_string()),
            ..StationPatch::default()
        };
        let result = service.update(&central.id, &patch).await;
        assert!(matches!(result, Err(Error::Conflict(_))));

        // only the casing of its own name
        let patch = StationPatch {
            name: Some(" CENTRAL ".to_string()),
            ..StationPatch::default()
        };
        let updated = service.update(&central.id, &patch).await.unwrap().unwrap();
        assert_eq!("CENTRAL", updated.name);
    }

    #[tokio::test]
    async fn test_update_missing() {
        let service = service();

        let result = service
            .update(&Uuid::new_v4(), &StationPatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let service = service();

        let station = service
            .create("Central", "Main St", StationType::Origin)
            .await
            .unwrap();

        assert_eq!(
            DeleteOutcome::Deleted,
            service.delete_with_outcome(&station.id).await.unwrap()
        );

        let deleted = service
            .storage()
            .find_single_station_by_id_unchecked(&station.id)
            .await
            .unwrap()
            .unwrap();
        assert!(deleted.is_deleted);
        assert!(!deleted.is_active);
        assert!(deleted.deleted_at.is_some());

        assert_eq!(
            DeleteOutcome::AlreadyDeleted,
            service.delete_with_outcome(&station.id).await.unwrap()
        );
        assert!(!service.delete(&station.id).await.unwrap());

        let deleted_again = service
            .storage()
            .find_single_station_by_id_unchecked(&station.id)
            .await
            .unwrap()
            .unwrap();
        assert!(deleted_again.is_deleted);
        assert_eq!(deleted.deleted_at, deleted_again.deleted_at);

        assert!(service.get_by_id(&station.id).await.unwrap().is_none());
        assert!(!service.exists_by_id(&station.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let service = service();

        assert_eq!(
            DeleteOutcome::NotFound,
            service.delete_with_outcome(&Uuid::new_v4()).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_list() {
        let service = service();

        service
            .create("Pedro de Valdivia", "Av. Providencia 2834", StationType::Intermediate)
            .await
            .unwrap();
        let baquedano = service
            .create("Baquedano", "Plaza Baquedano", StationType::Intermediate)
            .await
            .unwrap();
        let los_leones = service
            .create("Los Leones", "Av. Providencia 3560", StationType::Destination)
            .await
            .unwrap();
        let deleted = service
            .create("Salvador", "Av. Providencia 1445", StationType::Intermediate)
            .await
            .unwrap();

        service.delete(&deleted.id).await.unwrap();
        service
            .update(
                &los_leones.id,
                &StationPatch {
                    is_active: Some(false),
                    ..StationPatch::default()
                },
            )
            .await
            .unwrap();

        let names = |summaries: Vec<StationSummary>| {
            summaries
                .into_iter()
                .map(|summary| summary.name)
                .collect::<Vec<String>>()
        };

        let all = service.list(StationFilter::default()).await.unwrap();
        assert_eq!(
            vec!["Baquedano", "Los Leones", "Pedro de Valdivia"],
            names(all)
        );

        let inactive = service
            .list(StationFilter {
                is_active: Some(false),
                ..StationFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(1, inactive.len());
        assert_eq!("Inactive", inactive[0].status);
        assert_eq!("Destination", inactive[0].station_type);

        let filtered = service
            .list(StationFilter {
                name: Some(" DE ".to_string()),
                station_type: Some(StationType::Intermediate),
                is_active: Some(true),
            })
            .await
            .unwrap();
        assert_eq!(vec!["Pedro de Valdivia"], names(filtered));

        let blank_name = service
            .list(StationFilter {
                name: Some("  ".to_string()),
                ..StationFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(3, blank_name.len());

        assert!(service.exists_by_id(&baquedano.id).await.unwrap());
    }
}
