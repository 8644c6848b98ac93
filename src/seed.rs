//! Seed the storage with a default set of stations

use anyhow::Result;

use crate::service::StationPatch;
use crate::service::StationService;
use crate::stations::StationType;
use crate::storage::StationFilter;
use crate::storage::Storage;

/// A station to seed
struct Seed {
    name: &'static str,
    location: &'static str,
    station_type: StationType,
    is_active: bool,
}

const SEEDS: [Seed; 11] = [
    Seed {
        name: "Estación Central",
        location: "Av. Libertador Bernardo O'Higgins 3322, Santiago",
        station_type: StationType::Origin,
        is_active: true,
    },
    Seed {
        name: "Plaza de Armas",
        location: "Plaza de Armas s/n, Santiago Centro",
        station_type: StationType::Intermediate,
        is_active: true,
    },
    Seed {
        name: "Universidad de Chile",
        location: "Alameda 1058, Santiago",
        station_type: StationType::Intermediate,
        is_active: true,
    },
    Seed {
        name: "Santa Lucía",
        location: "Alameda con Santa Lucía, Santiago",
        station_type: StationType::Intermediate,
        is_active: true,
    },
    Seed {
        name: "Universidad Católica",
        location: "Alameda 390, Santiago",
        station_type: StationType::Intermediate,
        is_active: true,
    },
    Seed {
        name: "Baquedano",
        location: "Plaza Baquedano s/n, Providencia",
        station_type: StationType::Intermediate,
        is_active: true,
    },
    Seed {
        name: "Salvador",
        location: "Av. Providencia 1445, Providencia",
        station_type: StationType::Intermediate,
        is_active: true,
    },
    Seed {
        name: "Manuel Montt",
        location: "Av. Providencia 2330, Providencia",
        station_type: StationType::Intermediate,
        is_active: true,
    },
    Seed {
        name: "Pedro de Valdivia",
        location: "Av. Providencia 2834, Providencia",
        station_type: StationType::Intermediate,
        is_active: true,
    },
    Seed {
        name: "Los Leones",
        location: "Av. Providencia 3560, Las Condes",
        station_type: StationType::Destination,
        is_active: true,
    },
    Seed {
        name: "Estación Mantenimiento",
        location: "Zona Industrial, Santiago",
        station_type: StationType::Intermediate,
        is_active: false,
    },
];

/// Seed the default stations when there are no stations yet
///
/// Goes through the service, so the regular rules apply
pub async fn ensure_initial_stations<S: Storage>(service: &StationService<S>) -> Result<()> {
    let stations = service.list(StationFilter::default()).await?;

    if !stations.is_empty() {
        tracing::debug!("Stations already present, skipping seed");

        return Ok(());
    }

    for seed in &SEEDS {
        let station = service
            .create(seed.name, seed.location, seed.station_type)
            .await?;

        if !seed.is_active {
            let patch = StationPatch {
                is_active: Some(false),
                ..StationPatch::default()
            };

            service.update(&station.id, &patch).await?;
        }
    }

    tracing::info!("Seeded {} stations", SEEDS.len());

    Ok(())
}
