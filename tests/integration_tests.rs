use axum::http::StatusCode;
use axum_test::TestServer;
use package_tracker::{
    adapters::inbound::http::{
        dto::{ErrorResponseDto, PackageDto},
        router::{AppState, create_router},
    },
    create_in_memory_app,
};
use serde_json::json;
use std::sync::Arc;

async fn setup_test_server() -> TestServer {
    let services = create_in_memory_app().await.unwrap();

    let state = AppState {
        package_service: Arc::new(services.package_service),
    };

    let app = create_router(state);
    TestServer::new(app).unwrap()
}

async fn create_package(server: &TestServer, title: &str) -> PackageDto {
    let response = server
        .post("/api/packages")
        .json(&json!({
            "title": title,
            "weight": 5,
            "senderEmail": "a@b.com",
            "senderName": "A"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn test_create_package() {
    let server = setup_test_server().await;

    let response = server
        .post("/api/packages")
        .json(&json!({
            "title": "Playstation 5 Pro",
            "weight": 5,
            "senderEmail": "a@b.com",
            "senderName": "A"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let package: PackageDto = response.json();
    assert_eq!(package.title, "Playstation 5 Pro");
    assert_eq!(package.weight, 5.0);
    assert!(!package.code.is_empty());
    assert!(!package.delivered);
    assert!(package.updates.is_empty());

    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert_eq!(location, Some(format!("/api/packages/{}", package.code)));
}

#[tokio::test]
async fn test_create_package_with_short_title() {
    let server = setup_test_server().await;

    let response = server
        .post("/api/packages")
        .json(&json!({ "title": "short", "weight": 5, "senderEmail": "a@b.com", "senderName": "A" }))
        .await;

    response.assert_status_bad_request();
    let error: ErrorResponseDto = response.json();
    assert_eq!(error.error, "ValidationError");
    assert_eq!(
        error.details.unwrap().get("field"),
        Some(&json!("title"))
    );

    let packages: Vec<PackageDto> = server.get("/api/packages").await.json();
    assert!(packages.is_empty());
}

#[tokio::test]
async fn test_create_package_with_invalid_weight() {
    let server = setup_test_server().await;

    for weight in [0.0, -1.5] {
        server
            .post("/api/packages")
            .json(&json!({ "title": "Playstation 5 Pro", "weight": weight }))
            .await
            .assert_status_bad_request();
    }
}

#[tokio::test]
async fn test_get_package() {
    let server = setup_test_server().await;
    let created = create_package(&server, "Xbox Series X Console").await;

    let response = server.get(&format!("/api/packages/{}", created.code)).await;

    response.assert_status_ok();
    let package: PackageDto = response.json();
    assert_eq!(package.code, created.code);
    assert_eq!(package.title, "Xbox Series X Console");
}

#[tokio::test]
async fn test_get_unknown_package() {
    let server = setup_test_server().await;

    server
        .get("/api/packages/00000000-0000-4000-8000-000000000000")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_add_update() {
    let server = setup_test_server().await;
    let created = create_package(&server, "Playstation 5 Pro").await;

    server
        .post(&format!("/api/packages/{}/updates", created.code))
        .json(&json!({ "status": "In transit", "delivered": false }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let package: PackageDto = server
        .get(&format!("/api/packages/{}", created.code))
        .await
        .json();
    assert_eq!(package.updates.len(), 1);
    assert_eq!(package.updates[0].status, "In transit");
    assert_eq!(package.updates[0].package_id, created.code);
    assert!(package.updates[0].update_date >= package.posted_at);
}

#[tokio::test]
async fn test_add_update_to_unknown_package() {
    let server = setup_test_server().await;

    server
        .post("/api/packages/00000000-0000-4000-8000-000000000000/updates")
        .json(&json!({ "status": "In transit", "delivered": false }))
        .await
        .assert_status_not_found();

    let packages: Vec<PackageDto> = server.get("/api/packages").await.json();
    assert!(packages.is_empty());
}

#[tokio::test]
async fn test_add_blank_update() {
    let server = setup_test_server().await;
    let created = create_package(&server, "Playstation 5 Pro").await;

    server
        .post(&format!("/api/packages/{}/updates", created.code))
        .json(&json!({ "status": "   " }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_update_after_delivery_conflicts() {
    let server = setup_test_server().await;
    let created = create_package(&server, "Playstation 5 Pro").await;
    let updates_url = format!("/api/packages/{}/updates", created.code);

    server
        .post(&updates_url)
        .json(&json!({ "status": "Delivered", "delivered": true }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = server
        .post(&updates_url)
        .json(&json!({ "status": "Lost", "delivered": false }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let error: ErrorResponseDto = response.json();
    assert_eq!(error.error, "AlreadyDelivered");

    let package: PackageDto = server
        .get(&format!("/api/packages/{}", created.code))
        .await
        .json();
    assert!(package.delivered);
    assert_eq!(package.updates.len(), 1);
}

#[tokio::test]
async fn test_delete_package() {
    let server = setup_test_server().await;
    let created = create_package(&server, "Playstation 5 Pro").await;
    let url = format!("/api/packages/{}", created.code);

    server.delete(&url).await.assert_status_ok();
    server.get(&url).await.assert_status_not_found();
    server.delete(&url).await.assert_status_not_found();
}

#[tokio::test]
async fn test_delete_through_deletes_resource_ignores_body() {
    let server = setup_test_server().await;
    let created = create_package(&server, "Playstation 5 Pro").await;

    server
        .delete(&format!("/api/packages/{}/deletes", created.code))
        .json(&json!({ "code": "something-else" }))
        .await
        .assert_status_ok();

    server
        .get(&format!("/api/packages/{}", created.code))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_list_packages() {
    let server = setup_test_server().await;
    let first = create_package(&server, "Playstation 5 Pro").await;
    let second = create_package(&server, "Nintendo Switch 2").await;

    let response = server.get("/api/packages").await;

    response.assert_status_ok();
    let packages: Vec<PackageDto> = response.json();
    let codes: Vec<&str> = packages.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(packages.len(), 2);
    assert!(codes.contains(&first.code.as_str()));
    assert!(codes.contains(&second.code.as_str()));
}
