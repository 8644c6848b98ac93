use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::tests::helper;

#[tokio::test]
async fn test_station_update() {
    let mut app = helper::setup_test_app().await;

    let station = helper::create_station(&mut app, "Central", "Main St", "Origin").await;

    let (status_code, updated, error) = helper::maybe_update_station(
        &mut app,
        &station.id.to_string(),
        json!({ "name": " Central Hub ", "location": "Second St", "type": "Destination" }),
    )
    .await;
    assert_eq!(StatusCode::OK, status_code);
    assert!(error.is_none());

    let updated = updated.unwrap();
    assert_eq!(station.id, updated.id);
    assert_eq!("Central Hub", updated.name);
    assert_eq!("Second St", updated.location);
    assert_eq!("Destination", updated.station_type);
    assert!(updated.is_active);
    assert_eq!(station.created_at, updated.created_at);
    assert!(updated.updated_at.unwrap() >= updated.created_at);
}

#[tokio::test]
async fn test_station_update_only_active() {
    let mut app = helper::setup_test_app().await;

    let station = helper::create_station(&mut app, "Central", "Main St", "Origin").await;
    assert!(station.updated_at.is_none());

    let (status_code, updated, _) = helper::maybe_update_station(
        &mut app,
        &station.id.to_string(),
        json!({ "isActive": false }),
    )
    .await;
    assert_eq!(StatusCode::OK, status_code);

    let updated = updated.unwrap();
    assert!(!updated.is_active);
    assert_eq!(station.name, updated.name);
    assert_eq!(station.location, updated.location);
    assert_eq!(station.station_type, updated.station_type);
    assert!(updated.updated_at.unwrap() >= station.created_at);

    let (_, fetched) = helper::single_station(&mut app, &station.id.to_string()).await;
    assert!(!fetched.unwrap().is_active);
}

#[tokio::test]
async fn test_station_update_blank_values() {
    let mut app = helper::setup_test_app().await;

    let station = helper::create_station(&mut app, "Central", "Main St", "Origin").await;

    let (status_code, updated, _) = helper::maybe_update_station(
        &mut app,
        &station.id.to_string(),
        json!({ "name": "   ", "location": "" }),
    )
    .await;
    assert_eq!(StatusCode::OK, status_code);

    let updated = updated.unwrap();
    assert_eq!("Central", updated.name);
    assert_eq!("Main St", updated.location);
    assert!(updated.updated_at.is_some());
}

#[tokio::test]
async fn test_station_update_name_conflict() {
    let mut app = helper::setup_test_app().await;

    helper::create_station(&mut app, "Central", "Main St", "Origin").await;
    let station = helper::create_station(&mut app, "Harbour", "Quay 1", "Destination").await;

    let (status_code, updated, error) = helper::maybe_update_station(
        &mut app,
        &station.id.to_string(),
        json!({ "name": "CENTRAL" }),
    )
    .await;
    assert_eq!(StatusCode::CONFLICT, status_code);
    assert!(updated.is_none());
    assert_eq!(
        "Another station with this name already exists",
        error.unwrap().error
    );

    let (_, fetched) = helper::single_station(&mut app, &station.id.to_string()).await;
    assert_eq!("Harbour", fetched.unwrap().name);
}

#[tokio::test]
async fn test_station_update_own_name_casing() {
    let mut app = helper::setup_test_app().await;

    let station = helper::create_station(&mut app, "Central", "Main St", "Origin").await;

    let (status_code, updated, _) = helper::maybe_update_station(
        &mut app,
        &station.id.to_string(),
        json!({ "name": "CENTRAL" }),
    )
    .await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!("CENTRAL", updated.unwrap().name);
}

#[tokio::test]
async fn test_station_update_too_long() {
    let mut app = helper::setup_test_app().await;

    let station = helper::create_station(&mut app, "Central", "Main St", "Origin").await;

    let (status_code, _, error) = helper::maybe_update_station(
        &mut app,
        &station.id.to_string(),
        json!({ "name": "n".repeat(101) }),
    )
    .await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);

    let error = error.unwrap();
    assert_eq!("Validation error", error.error);
    assert!(error.fields.unwrap().contains_key("name"));
}

#[tokio::test]
async fn test_station_update_unknown() {
    let mut app = helper::setup_test_app().await;

    let (status_code, _, error) = helper::maybe_update_station(
        &mut app,
        &Uuid::new_v4().to_string(),
        json!({ "isActive": false }),
    )
    .await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!("Station not found", error.unwrap().error);
}

#[tokio::test]
async fn test_station_update_deleted() {
    let mut app = helper::setup_test_app().await;

    let station = helper::create_station(&mut app, "Central", "Main St", "Origin").await;
    helper::maybe_delete_station(&mut app, &station.id.to_string()).await;

    let (status_code, _, _) = helper::maybe_update_station(
        &mut app,
        &station.id.to_string(),
        json!({ "name": "Central Hub" }),
    )
    .await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
}

#[tokio::test]
async fn test_station_update_invalid_id() {
    let mut app = helper::setup_test_app().await;

    let (status_code, _, error) = helper::maybe_update_station(
        &mut app,
        &Uuid::nil().to_string(),
        json!({ "isActive": false }),
    )
    .await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Invalid station ID", error.unwrap().error);

    let (status_code, _, error) =
        helper::maybe_update_station(&mut app, "not-a-uuid", json!({ "isActive": false })).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Invalid path parameter", error.unwrap().error);
}

#[tokio::test]
async fn test_station_update_long_blank_values() {
    let mut app = helper::setup_test_app().await;

    let station = helper::create_station(&mut app, "Central", "Main St", "Origin").await;

    let (status_code, updated, error) = helper::maybe_update_station(
        &mut app,
        &station.id.to_string(),
        json!({ "name": " ".repeat(120), "location": " ".repeat(300) }),
    )
    .await;
    assert_eq!(StatusCode::OK, status_code);
    assert!(error.is_none());

    let updated = updated.unwrap();
    assert_eq!("Central", updated.name);
    assert_eq!("Main St", updated.location);
}

#[tokio::test]
async fn test_station_update_padded_at_limit() {
    let mut app = helper::setup_test_app().await;

    let station = helper::create_station(&mut app, "Central", "Main St", "Origin").await;

    let (status_code, updated, _) = helper::maybe_update_station(
        &mut app,
        &station.id.to_string(),
        json!({ "name": format!("  {}  ", "n".repeat(100)) }),
    )
    .await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!("n".repeat(100), updated.unwrap().name);
}
