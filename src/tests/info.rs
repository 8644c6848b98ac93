use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_info() {
    let mut app = helper::setup_test_app().await;

    let (status_code, body) = helper::get(&mut app, "/info").await;
    assert_eq!(StatusCode::OK, status_code);

    let data = &body["data"];
    assert_eq!("stations", data["service"]);
    assert_eq!(env!("CARGO_PKG_VERSION"), data["version"]);
    assert_eq!("development", data["environment"]);
    assert_eq!("memory", data["database"]);
    assert!(data["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_route() {
    let mut app = helper::setup_test_app().await;

    let (status_code, body) = helper::get(&mut app, "/api/unknown").await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!("Not found", body["error"]);
}
