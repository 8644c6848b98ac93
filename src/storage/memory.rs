//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::stations::Station;

use super::CreateStationValues;
use super::Error;
use super::Result;
use super::StationFilter;
use super::Storage;
use super::UpdateStationValues;

/// An in-memory storage
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// All stations in storage, deleted ones included
    stations: Arc<Mutex<HashMap<Uuid, Station>>>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

/// Is the name taken by another station that is not deleted?
///
/// Mirrors the unique index on `lower(name)` of the Postgres storage
fn is_name_taken(stations: &HashMap<Uuid, Station>, name: &str, exclude_id: Option<&Uuid>) -> bool {
    let name = name.to_lowercase();

    stations.values().any(|station| {
        !station.is_deleted
            && Some(&station.id) != exclude_id
            && station.name.to_lowercase() == name
    })
}

fn unique_violation(name: &str) -> Error {
    Error::UniqueViolation(format!(r#"Station name "{name}" is already taken"#))
}

#[async_trait]
impl Storage for Memory {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn find_all_stations(&self, filter: &StationFilter) -> Result<Vec<Station>> {
        let mut stations = self
            .stations
            .lock()
            .await
            .values()
            .filter(|station| !station.is_deleted && filter.matches(station))
            .cloned()
            .collect::<Vec<Station>>();

        stations.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(stations)
    }

    async fn find_single_station_by_name(&self, name: &str) -> Result<Option<Station>> {
        let name = name.to_lowercase();

        Ok(self
            .stations
            .lock()
            .await
            .values()
            .find(|station| !station.is_deleted && station.name.to_lowercase() == name)
            .cloned())
    }

    async fn find_single_station_by_id(&self, id: &Uuid) -> Result<Option<Station>> {
        Ok(self
            .stations
            .lock()
            .await
            .get(id)
            .filter(|station| !station.is_deleted)
            .cloned())
    }

    async fn find_single_station_by_id_unchecked(&self, id: &Uuid) -> Result<Option<Station>> {
        Ok(self.stations.lock().await.get(id).cloned())
    }

    async fn station_exists(&self, id: &Uuid) -> Result<bool> {
        Ok(self
            .stations
            .lock()
            .await
            .get(id)
            .is_some_and(|station| !station.is_deleted))
    }

    async fn create_station(&self, values: &CreateStationValues<'_>) -> Result<Station> {
        let mut stations = self.stations.lock().await;

        if is_name_taken(&stations, values.name, None) {
            return Err(unique_violation(values.name));
        }

        let station = Station {
            id: Uuid::new_v4(),
            name: values.name.to_string(),
            location: values.location.to_string(),
            station_type: values.station_type,
            is_active: true,
            created_at: Utc::now().naive_utc(),
            updated_at: None,
            deleted_at: None,
            is_deleted: false,
        };

        stations.insert(station.id, station.clone());

        Ok(station)
    }

    async fn update_station(
        &self,
        station: &Station,
        values: &UpdateStationValues<'_>,
    ) -> Result<Option<Station>> {
        let mut stations = self.stations.lock().await;

        if let Some(name) = values.name {
            if is_name_taken(&stations, name, Some(&station.id)) {
                return Err(unique_violation(name));
            }
        }

        Ok(stations
            .get_mut(&station.id)
            .filter(|station| !station.is_deleted)
            .map(|station| {
                if let Some(name) = values.name {
                    station.name = name.to_string();
                }

                if let Some(location) = values.location {
                    station.location = location.to_string();
                }

                if let Some(station_type) = values.station_type {
                    station.station_type = station_type;
                }

                if let Some(is_active) = values.is_active {
                    station.is_active = is_active;
                }

                station.updated_at = Some(Utc::now().naive_utc());

                station.clone()
            }))
    }

    async fn delete_station(&self, station: &Station) -> Result<bool> {
        let mut stations = self.stations.lock().await;

        let Some(station) = stations
            .get_mut(&station.id)
            .filter(|station| !station.is_deleted)
        else {
            return Ok(false);
        };

        let now = Utc::now().naive_utc();

        station.is_deleted = true;
        station.is_active = false;
        station.deleted_at = Some(now);
        station.updated_at = Some(now);

        Ok(true)
    }
}
