use httpmock::prelude::*;
use package_tracker::{
    AppBuilder, CreatePackageRequest, DispatchConfig, EmailMessage, NotificationBackend,
    NotificationError, NotificationGateway, PackageService, RetryConfig, SendGridConfig,
    SendGridGateway, services::deliver_with_retry,
};
use std::time::Duration;

fn config_for(server: &MockServer) -> SendGridConfig {
    SendGridConfig::new("SG.test", "noreply@example.com", "Package Tracker")
        .with_base_url(server.base_url())
        .with_timeout(Duration::from_secs(2))
}

fn message() -> EmailMessage {
    EmailMessage::builder()
        .to_address("a@b.com")
        .to_name("A")
        .subject("Your package was dispatched.")
        .body("Your package with code abc-123 was dispatched.")
        .build()
}

fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(5),
        multiplier: 2.0,
    }
}

#[tokio::test]
async fn test_accepted_message_returns_ack() {
    let server = MockServer::start_async().await;
    let send_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v3/mail/send")
                .header("authorization", "Bearer SG.test")
                .body_contains("\"email\":\"a@b.com\"")
                .body_contains("Your package with code abc-123 was dispatched.");
            then.status(202).header("x-message-id", "msg-42");
        })
        .await;

    let gateway = SendGridGateway::new(config_for(&server)).unwrap();
    let ack = gateway.send(&message()).await.unwrap();

    send_mock.assert_async().await;
    assert_eq!(ack.message_id.as_deref(), Some("msg-42"));
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v3/mail/send");
            then.status(503).body("unavailable");
        })
        .await;

    let gateway = SendGridGateway::new(config_for(&server)).unwrap();
    let result = gateway.send(&message()).await;

    assert!(matches!(result, Err(NotificationError::Transient { .. })));
}

#[tokio::test]
async fn test_bad_request_is_permanent() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v3/mail/send");
            then.status(400)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({ "errors": [{ "message": "invalid email" }] }));
        })
        .await;

    let gateway = SendGridGateway::new(config_for(&server)).unwrap();
    let result = gateway.send(&message()).await;

    match result {
        Err(NotificationError::Permanent { message }) => assert!(message.contains("400")),
        other => panic!("Expected permanent failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_retries_stop_at_max_attempts() {
    let server = MockServer::start_async().await;
    let send_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v3/mail/send");
            then.status(429);
        })
        .await;

    let gateway = SendGridGateway::new(config_for(&server)).unwrap();
    let result =
        deliver_with_retry(&gateway, &message(), Duration::from_secs(2), &fast_retry(3)).await;

    assert!(matches!(result, Err(NotificationError::Transient { .. })));
    send_mock.assert_hits_async(3).await;
}

#[tokio::test]
async fn test_permanent_failure_is_sent_once() {
    let server = MockServer::start_async().await;
    let send_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v3/mail/send");
            then.status(401);
        })
        .await;

    let gateway = SendGridGateway::new(config_for(&server)).unwrap();
    let result =
        deliver_with_retry(&gateway, &message(), Duration::from_secs(2), &fast_retry(5)).await;

    assert!(matches!(result, Err(NotificationError::Permanent { .. })));
    send_mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_create_package_sends_dispatch_email() {
    let server = MockServer::start_async().await;
    let send_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v3/mail/send")
                .body_contains("Your package was dispatched.");
            then.status(202);
        })
        .await;

    let app = AppBuilder::new()
        .with_notification_backend(NotificationBackend::SendGrid(config_for(&server)))
        .with_dispatch_config(DispatchConfig {
            retry: fast_retry(2),
            ..DispatchConfig::default()
        })
        .build()
        .await
        .unwrap();

    let package = app
        .package_service
        .create_package(CreatePackageRequest {
            title: "Playstation 5 Pro".to_string(),
            weight: 5.0,
            sender_name: "A".to_string(),
            sender_email: "a@b.com".to_string(),
        })
        .await
        .unwrap();

    // Dropping the service closes the queue; the worker flushes before exiting
    drop(app.package_service);
    app.notification_worker.await.unwrap();

    send_mock.assert_hits_async(1).await;
    assert!(!package.code.as_str().is_empty());
}

#[tokio::test]
async fn test_create_package_survives_gateway_outage() {
    let server = MockServer::start_async().await;
    let send_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v3/mail/send");
            then.status(500);
        })
        .await;

    let app = AppBuilder::new()
        .with_notification_backend(NotificationBackend::SendGrid(config_for(&server)))
        .with_dispatch_config(DispatchConfig {
            retry: fast_retry(2),
            ..DispatchConfig::default()
        })
        .build()
        .await
        .unwrap();

    let package = app
        .package_service
        .create_package(CreatePackageRequest {
            title: "Playstation 5 Pro".to_string(),
            weight: 5.0,
            sender_name: "A".to_string(),
            sender_email: "a@b.com".to_string(),
        })
        .await
        .unwrap();

    let stored = app.package_service.get_package(&package.code).await.unwrap();
    assert_eq!(stored.code, package.code);

    drop(app.package_service);
    app.notification_worker.await.unwrap();
    send_mock.assert_hits_async(2).await;
}
