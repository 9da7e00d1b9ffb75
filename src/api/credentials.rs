//! FBR credential API endpoints.
//!
//! Stores, inspects, deletes, and connection-tests a user's FBR API keys.
//! Request bodies are parsed into typed structs at the boundary; every
//! cryptographic failure is converted into a generic response here so
//! clients cannot distinguish a malformed stored token from a failed
//! integrity check. Plaintext keys never appear in responses or logs.

use crate::api::auth::identify_user;
use crate::credentials::CredentialStore;
use crate::fbr::{FbrClient, FbrEnvironment};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared application state for the credential API
#[derive(Clone)]
pub struct CredentialAppState {
    /// Absent when the credential secret is not configured; every
    /// credential route then answers with a generic failure.
    pub credential_store: Option<Arc<CredentialStore>>,
    pub fbr_client: Arc<FbrClient>,
    pub auth_enabled: bool,
}

/// Request body for POST /api/fbr/credentials
#[derive(Deserialize)]
pub struct StoreCredentialRequest {
    pub api_key: String,
    pub environment: FbrEnvironment,
}

/// Response for POST /api/fbr/credentials
#[derive(Serialize)]
pub struct StoreCredentialResponse {
    pub success: bool,
    pub environment: FbrEnvironment,
}

/// Response for GET /api/fbr/credentials
#[derive(Serialize)]
pub struct CredentialStatusResponse {
    pub sandbox: bool,
    pub production: bool,
}

/// Response for DELETE /api/fbr/credentials/:environment
#[derive(Serialize)]
pub struct DeleteCredentialResponse {
    pub success: bool,
}

/// Response for POST /api/fbr/credentials/:environment/test
#[derive(Serialize)]
pub struct ConnectionTestResponse {
    pub status: String,
    pub message: String,
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Application error types
enum AppError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    ServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}

/// Create the credential API router
pub fn create_credential_router(state: CredentialAppState) -> Router {
    Router::new()
        .route("/api/fbr/credentials", post(store_credential))
        .route("/api/fbr/credentials", get(credential_status))
        .route("/api/fbr/credentials/:environment", delete(delete_credential))
        .route("/api/fbr/credentials/:environment/test", post(test_credential))
        .with_state(Arc::new(state))
}

fn require_store(state: &CredentialAppState) -> Result<&Arc<CredentialStore>, AppError> {
    state.credential_store.as_ref().ok_or_else(|| {
        AppError::ServerError(
            "Credential storage not available (BETTERBOOKS_CREDENTIAL_SECRET not set)".to_string(),
        )
    })
}

fn parse_environment(name: &str) -> Result<FbrEnvironment, AppError> {
    FbrEnvironment::parse(name)
        .ok_or_else(|| AppError::NotFound(format!("Unknown FBR environment '{}'", name)))
}

/// POST /api/fbr/credentials - Store an FBR API key
///
/// Encrypts and stores the submitted key for the caller. Replaces any
/// previously stored key for the same environment.
async fn store_credential(
    State(state): State<Arc<CredentialAppState>>,
    headers: HeaderMap,
    Json(body): Json<StoreCredentialRequest>,
) -> Result<Json<StoreCredentialResponse>, AppError> {
    let store = require_store(&state)?;
    let user_id = identify_user(&headers, state.auth_enabled)
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

    if body.api_key.trim().is_empty() {
        return Err(AppError::BadRequest("API key must not be empty".to_string()));
    }

    debug!(
        user_id = %user_id,
        environment = %body.environment,
        "Storing FBR API key"
    );

    store
        .store(&user_id, body.environment, &body.api_key)
        .map_err(|e| {
            warn!(
                user_id = %user_id,
                environment = %body.environment,
                error = %e,
                "Failed to store FBR API key"
            );
            AppError::ServerError("Failed to store credentials".to_string())
        })?;

    info!(
        user_id = %user_id,
        environment = %body.environment,
        "FBR API key stored"
    );

    Ok(Json(StoreCredentialResponse {
        success: true,
        environment: body.environment,
    }))
}

/// GET /api/fbr/credentials - Which environments have a stored key
///
/// Reports presence only; no key material is returned, not even sealed.
async fn credential_status(
    State(state): State<Arc<CredentialAppState>>,
    headers: HeaderMap,
) -> Result<Json<CredentialStatusResponse>, AppError> {
    let store = require_store(&state)?;
    let user_id = identify_user(&headers, state.auth_enabled)
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

    let configured = store.list_by_user(&user_id).map_err(|e| {
        warn!(user_id = %user_id, error = %e, "Failed to list credentials");
        AppError::ServerError("Failed to list credentials".to_string())
    })?;

    Ok(Json(CredentialStatusResponse {
        sandbox: configured.contains(&FbrEnvironment::Sandbox),
        production: configured.contains(&FbrEnvironment::Production),
    }))
}

/// DELETE /api/fbr/credentials/:environment - Remove a stored key
async fn delete_credential(
    State(state): State<Arc<CredentialAppState>>,
    headers: HeaderMap,
    Path(environment): Path<String>,
) -> Result<Json<DeleteCredentialResponse>, AppError> {
    let store = require_store(&state)?;
    let environment = parse_environment(&environment)?;
    let user_id = identify_user(&headers, state.auth_enabled)
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

    debug!(
        user_id = %user_id,
        environment = %environment,
        "Deleting FBR API key"
    );

    let deleted = store.delete(&user_id, environment).map_err(|e| {
        warn!(
            user_id = %user_id,
            environment = %environment,
            error = %e,
            "Failed to delete credential"
        );
        AppError::ServerError("Failed to delete credentials".to_string())
    })?;

    if !deleted {
        return Err(AppError::NotFound(format!(
            "No FBR API key stored for environment '{}'",
            environment
        )));
    }

    info!(
        user_id = %user_id,
        environment = %environment,
        "FBR API key deleted"
    );

    Ok(Json(DeleteCredentialResponse { success: true }))
}

/// POST /api/fbr/credentials/:environment/test - FBR connectivity check
///
/// Unseals the stored key and forwards it to the gateway with a bounded
/// deadline. The outcome classification (connected / invalid_key /
/// not_authorized / timeout / network_error) is returned as-is; a key
/// that cannot be unsealed surfaces as a generic failure.
async fn test_credential(
    State(state): State<Arc<CredentialAppState>>,
    headers: HeaderMap,
    Path(environment): Path<String>,
) -> Result<Json<ConnectionTestResponse>, AppError> {
    let store = require_store(&state)?;
    let environment = parse_environment(&environment)?;
    let user_id = identify_user(&headers, state.auth_enabled)
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

    let api_key = store
        .get(&user_id, environment)
        .map_err(|e| {
            // Malformed token and integrity failure land here; detail
            // stays in the server log
            warn!(
                user_id = %user_id,
                environment = %environment,
                error = %e,
                "Failed to load stored FBR API key"
            );
            AppError::ServerError("Failed to load credentials".to_string())
        })?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No FBR API key stored for environment '{}'",
                environment
            ))
        })?;

    debug!(
        user_id = %user_id,
        environment = %environment,
        "Running FBR connectivity check"
    );

    let outcome = state.fbr_client.test_connection(&api_key, environment).await;

    info!(
        user_id = %user_id,
        environment = %environment,
        outcome = outcome.as_str(),
        "FBR connectivity check completed"
    );

    Ok(Json(ConnectionTestResponse {
        status: outcome.as_str().to_string(),
        message: outcome.message(),
    }))
}
