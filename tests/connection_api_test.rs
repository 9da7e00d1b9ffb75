// Integration tests for the FBR connectivity check endpoint

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use betterbooks::api::{create_credential_router, CredentialAppState};
use betterbooks::credentials::CredentialStore;
use betterbooks::fbr::{FbrClient, FbrEnvironment};
use mockito::Server;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const TEST_SECRET: &str = "integration-test-secret";

/// App wired to a gateway at `base_url`, with one sandbox key stored.
fn create_app_with_gateway(base_url: String) -> Router {
    let store = CredentialStore::new(":memory:", TEST_SECRET).unwrap();
    store
        .store("default", FbrEnvironment::Sandbox, "sk_test_abc123")
        .unwrap();

    let state = CredentialAppState {
        credential_store: Some(Arc::new(store)),
        fbr_client: Arc::new(
            FbrClient::with_base_url(base_url).with_deadline(Duration::from_secs(5)),
        ),
        auth_enabled: false,
    };
    create_credential_router(state)
}

async fn run_sandbox_test(app: Router) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/fbr/credentials/sandbox/test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_connectivity_check_connected() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/di_data/v1/di/validateinvoicedata_sb")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"validationResponse":{"statusCode":"00"}}"#)
        .create_async()
        .await;

    let app = create_app_with_gateway(server.url());
    let (status, json) = run_sandbox_test(app).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "connected");
}

#[tokio::test]
async fn test_connectivity_check_invalid_key() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/di_data/v1/di/validateinvoicedata_sb")
        .with_status(401)
        .create_async()
        .await;

    let app = create_app_with_gateway(server.url());
    let (status, json) = run_sandbox_test(app).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "invalid_key");
}

#[tokio::test]
async fn test_connectivity_check_not_authorized() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/di_data/v1/di/validateinvoicedata_sb")
        .with_status(403)
        .create_async()
        .await;

    let app = create_app_with_gateway(server.url());
    let (status, json) = run_sandbox_test(app).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "not_authorized");
}

#[tokio::test]
async fn test_connectivity_check_gateway_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/di_data/v1/di/validateinvoicedata_sb")
        .with_status(503)
        .create_async()
        .await;

    let app = create_app_with_gateway(server.url());
    let (status, json) = run_sandbox_test(app).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "network_error");
}

#[tokio::test]
async fn test_connectivity_check_timeout() {
    // Gateway accepts connections but never responds
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let store = CredentialStore::new(":memory:", TEST_SECRET).unwrap();
    store
        .store("default", FbrEnvironment::Sandbox, "sk_test_abc123")
        .unwrap();

    let state = CredentialAppState {
        credential_store: Some(Arc::new(store)),
        fbr_client: Arc::new(
            FbrClient::with_base_url(format!("http://{}", addr))
                .with_deadline(Duration::from_millis(200)),
        ),
        auth_enabled: false,
    };
    let app = create_credential_router(state);

    let (status, json) = run_sandbox_test(app).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "timeout");
}

#[tokio::test]
async fn test_connectivity_check_without_stored_key() {
    let store = CredentialStore::new(":memory:", TEST_SECRET).unwrap();
    let state = CredentialAppState {
        credential_store: Some(Arc::new(store)),
        fbr_client: Arc::new(FbrClient::with_base_url(
            "http://127.0.0.1:9".to_string(),
        )),
        auth_enabled: false,
    };
    let app = create_credential_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/fbr/credentials/sandbox/test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_connectivity_check_unknown_environment() {
    let app = create_app_with_gateway("http://127.0.0.1:9".to_string());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/fbr/credentials/staging/test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_connectivity_check_without_credential_store() {
    let state = CredentialAppState {
        credential_store: None,
        fbr_client: Arc::new(FbrClient::with_base_url(
            "http://127.0.0.1:9".to_string(),
        )),
        auth_enabled: false,
    };
    let app = create_credential_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/fbr/credentials/sandbox/test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
