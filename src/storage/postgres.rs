//! Postgres storage

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::stations::Station;
use crate::stations::StationType;

use super::CreateStationValues;
use super::Error;
use super::Result;
use super::StationFilter;
use super::Storage;
use super::UpdateStationValues;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Columns of a station, in the order of [`SqlxStation`](SqlxStation)
const STATION_COLUMNS: &str = r"
    id,
    name,
    location,
    station_type,
    is_active,
    created_at,
    updated_at,
    deleted_at,
    is_deleted
";

/// Postgres type for station type
#[derive(Clone, Copy, PartialEq, Debug, sqlx::Type)]
#[sqlx(type_name = "station_type")]
#[sqlx(rename_all = "kebab-case")]
enum StationTypeType {
    /// Origin
    Origin,

    /// Intermediate
    Intermediate,

    /// Destination
    Destination,
}

impl StationTypeType {
    /// Create station type type from station type
    fn from_station_type(station_type: StationType) -> Self {
        match station_type {
            StationType::Origin => Self::Origin,
            StationType::Intermediate => Self::Intermediate,
            StationType::Destination => Self::Destination,
        }
    }

    /// Create station type from station type type
    fn to_station_type(self) -> StationType {
        match self {
            Self::Origin => StationType::Origin,
            Self::Intermediate => StationType::Intermediate,
            Self::Destination => StationType::Destination,
        }
    }
}

/// `SQLx` version of station
#[derive(sqlx::FromRow)]
struct SqlxStation {
    id: Uuid,
    name: String,
    location: String,
    station_type: StationTypeType,
    is_active: bool,
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
    deleted_at: Option<NaiveDateTime>,
    is_deleted: bool,
}

impl Station {
    /// Create station from `SQLx` version
    fn from_sqlx_station(station: SqlxStation) -> Self {
        Self {
            id: station.id,
            name: station.name,
            location: station.location,
            station_type: station.station_type.to_station_type(),
            is_active: station.is_active,
            created_at: station.created_at,
            updated_at: station.updated_at,
            deleted_at: station.deleted_at,
            is_deleted: station.is_deleted,
        }
    }

    /// Maybe create station from `SQLx` version
    fn from_sqlx_station_optional(station: Option<SqlxStation>) -> Option<Self> {
        station.map(Self::from_sqlx_station)
    }

    /// Create multiple stations from `SQLx` version
    fn from_sqlx_station_multiple(stations: Vec<SqlxStation>) -> Vec<Self> {
        stations.into_iter().map(Self::from_sqlx_station).collect()
    }
}

/// Postgres storage
#[derive(Clone, Debug)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Connect to Postgres
    ///
    /// Migrations will be run
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let connection_pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
            .map_err(storage_error)?;

        Self::with_pool(connection_pool).await
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    pub async fn with_pool(connection_pool: PgPool) -> Result<Self> {
        MIGRATOR
            .run(&connection_pool)
            .await
            .map_err(|err| Error::Connection(format!("Migrations could not run: {err}")))?;

        Ok(Self { connection_pool })
    }
}

#[async_trait]
impl Storage for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn find_all_stations(&self, filter: &StationFilter) -> Result<Vec<Station>> {
        let stations = sqlx::query_as::<_, SqlxStation>(&format!(
            r"
            SELECT {STATION_COLUMNS}
            FROM stations
            WHERE is_deleted = FALSE
                AND ($1::TEXT IS NULL OR strpos(lower(name), lower($1)) > 0)
                AND ($2::BOOLEAN IS NULL OR is_active = $2)
                AND ($3::station_type IS NULL OR station_type = $3)
            ORDER BY lower(name) ASC, name ASC
            "
        ))
        .bind(filter.name.as_deref())
        .bind(filter.is_active)
        .bind(filter.station_type.map(StationTypeType::from_station_type))
        .fetch_all(&self.connection_pool)
        .await
        .map(Station::from_sqlx_station_multiple)
        .map_err(storage_error)?;

        Ok(stations)
    }

    async fn find_single_station_by_name(&self, name: &str) -> Result<Option<Station>> {
        let station = sqlx::query_as::<_, SqlxStation>(&format!(
            r"
            SELECT {STATION_COLUMNS}
            FROM stations
            WHERE is_deleted = FALSE AND lower(name) = lower($1)
            LIMIT 1
            "
        ))
        .bind(name)
        .fetch_optional(&self.connection_pool)
        .await
        .map(Station::from_sqlx_station_optional)
        .map_err(storage_error)?;

        Ok(station)
    }

    async fn find_single_station_by_id(&self, id: &Uuid) -> Result<Option<Station>> {
        let station = sqlx::query_as::<_, SqlxStation>(&format!(
            r"
            SELECT {STATION_COLUMNS}
            FROM stations
            WHERE is_deleted = FALSE AND id = $1
            LIMIT 1
            "
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map(Station::from_sqlx_station_optional)
        .map_err(storage_error)?;

        Ok(station)
    }

    async fn find_single_station_by_id_unchecked(&self, id: &Uuid) -> Result<Option<Station>> {
        let station = sqlx::query_as::<_, SqlxStation>(&format!(
            r"
            SELECT {STATION_COLUMNS}
            FROM stations
            WHERE id = $1
            LIMIT 1
            "
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map(Station::from_sqlx_station_optional)
        .map_err(storage_error)?;

        Ok(station)
    }

    async fn station_exists(&self, id: &Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1
                FROM stations
                WHERE is_deleted = FALSE AND id = $1
            )
            ",
        )
        .bind(id)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(storage_error)?;

        Ok(exists)
    }

    async fn create_station(&self, values: &CreateStationValues<'_>) -> Result<Station> {
        let station = sqlx::query_as::<_, SqlxStation>(&format!(
            r"
            INSERT INTO stations (id, name, location, station_type, is_active)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING {STATION_COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(values.name)
        .bind(values.location)
        .bind(StationTypeType::from_station_type(values.station_type))
        .fetch_one(&self.connection_pool)
        .await
        .map(Station::from_sqlx_station)
        .map_err(storage_error)?;

        Ok(station)
    }

    async fn update_station(
        &self,
        station: &Station,
        values: &UpdateStationValues<'_>,
    ) -> Result<Option<Station>> {
        let updated_station = sqlx::query_as::<_, SqlxStation>(&format!(
            r"
            UPDATE stations
            SET name = $1,
                location = $2,
                station_type = $3,
                is_active = $4,
                updated_at = (now() AT TIME ZONE 'utc')
            WHERE id = $5 AND is_deleted = FALSE
            RETURNING {STATION_COLUMNS}
            "
        ))
        .bind(values.name.unwrap_or(&station.name))
        .bind(values.location.unwrap_or(&station.location))
        .bind(StationTypeType::from_station_type(
            values.station_type.unwrap_or(station.station_type),
        ))
        .bind(values.is_active.unwrap_or(station.is_active))
        .bind(station.id)
        .fetch_optional(&self.connection_pool)
        .await
        .map(Station::from_sqlx_station_optional)
        .map_err(storage_error)?;

        Ok(updated_station)
    }

    async fn delete_station(&self, station: &Station) -> Result<bool> {
        let result = sqlx::query(
            r"
            UPDATE stations
            SET is_deleted = TRUE,
                is_active = FALSE,
                deleted_at = (now() AT TIME ZONE 'utc'),
                updated_at = (now() AT TIME ZONE 'utc')
            WHERE id = $1 AND is_deleted = FALSE
            ",
        )
        .bind(station.id)
        .execute(&self.connection_pool)
        .await
        .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }
}

/// Convert `SQLx` to storage error
///
/// Violations of the unique name index are kept apart, everything else is a connection error
fn storage_error(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(ref database_error) = err {
        if database_error.is_unique_violation() {
            return Error::UniqueViolation(database_error.message().to_string());
        }
    }

    Error::Connection(err.to_string())
}
