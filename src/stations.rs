//! Stations
//!
//! The one entity of the service, with its human readable projections

use chrono::naive::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Role of a station within a line
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum StationType {
    /// First station of a line
    #[serde(alias = "origin")]
    Origin,

    /// Any station between the origin and the destination
    #[serde(alias = "intermediate")]
    Intermediate,

    /// Last station of a line
    #[serde(alias = "destination")]
    Destination,
}

impl StationType {
    /// Human readable label of the type
    ///
    /// No `Unknown` fallback, a type outside of the enum is rejected when it is deserialized
    pub fn label(self) -> &'static str {
        match self {
            Self::Origin => "Origin",
            Self::Intermediate => "Intermediate",
            Self::Destination => "Destination",
        }
    }
}

/// A station
#[derive(Clone, Debug)]
pub struct Station {
    /// Station ID
    pub id: Uuid,

    /// Name, unique (case-insensitive) among the stations that are not deleted
    pub name: String,

    /// Where the station is
    pub location: String,

    /// Type of station
    pub station_type: StationType,

    /// Is the station in service?
    ///
    /// Independent of the soft-delete, but a deleted station is never active
    pub is_active: bool,

    /// Creation date
    pub created_at: NaiveDateTime,

    /// Last updated at, never set on creation
    pub updated_at: Option<NaiveDateTime>,

    /// Soft-deleted at
    pub deleted_at: Option<NaiveDateTime>,

    /// Soft-deleted flag, never reverts to `false`
    pub is_deleted: bool,
}

impl Station {
    /// Human readable status of the station
    pub fn status_label(&self) -> &'static str {
        if self.is_active { "Active" } else { "Inactive" }
    }
}

/// Summary of a station as shown in listings
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationSummary {
    /// Station ID
    pub id: Uuid,

    /// Name of the station
    pub name: String,

    /// Location of the station
    pub location: String,

    /// Label of the station type
    #[serde(rename = "type")]
    pub station_type: &'static str,

    /// `Active` or `Inactive`
    pub status: &'static str,
}

impl StationSummary {
    /// Project a station into its summary
    pub fn from_station(station: Station) -> Self {
        let status = station.status_label();

        Self {
            id: station.id,
            name: station.name,
            location: station.location,
            station_type: station.station_type.label(),
            status,
        }
    }
}
