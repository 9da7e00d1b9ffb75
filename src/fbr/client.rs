//! Connectivity checks against the FBR digital invoicing gateway.

use super::FbrEnvironment;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;

/// Default FBR gateway base URL
const BASE_URL: &str = "https://gw.fbr.gov.pk";

/// Deadline for a connectivity check round trip
const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Outcome of an FBR connectivity check.
///
/// The upstream call is raced against a fixed deadline, so a stalled
/// gateway surfaces as `TimedOut` rather than hanging the caller. No
/// variant carries key material.
#[derive(Clone, Debug, PartialEq)]
pub enum ConnectionOutcome {
    /// Gateway accepted the key
    Connected,
    /// Gateway rejected the key (401)
    InvalidKey,
    /// Key was recognized but is not enrolled for this environment (403)
    NotAuthorized,
    /// No response within the deadline
    TimedOut,
    /// Transport failure or unexpected gateway status
    NetworkError(String),
}

impl ConnectionOutcome {
    /// Stable string form used in API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionOutcome::Connected => "connected",
            ConnectionOutcome::InvalidKey => "invalid_key",
            ConnectionOutcome::NotAuthorized => "not_authorized",
            ConnectionOutcome::TimedOut => "timeout",
            ConnectionOutcome::NetworkError(_) => "network_error",
        }
    }

    /// Human-readable message for API responses.
    pub fn message(&self) -> String {
        match self {
            ConnectionOutcome::Connected => "FBR gateway accepted the API key".to_string(),
            ConnectionOutcome::InvalidKey => {
                "FBR gateway rejected the API key (invalid or expired)".to_string()
            }
            ConnectionOutcome::NotAuthorized => {
                "API key is not authorized for this FBR environment".to_string()
            }
            ConnectionOutcome::TimedOut => {
                "FBR gateway did not respond within the deadline".to_string()
            }
            ConnectionOutcome::NetworkError(detail) => {
                format!("Could not reach the FBR gateway: {}", detail)
            }
        }
    }
}

/// HTTP client for the FBR gateway.
///
/// Authenticates with a Bearer token and sets a User-Agent header.
pub struct FbrClient {
    http_client: Client,
    base_url: String,
    deadline: Duration,
}

impl FbrClient {
    /// Create a client using the default FBR gateway base URL.
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL.to_string())
    }

    /// Create a client with a custom base URL (for testing with a mock server).
    pub fn with_base_url(base_url: String) -> Self {
        let http_client = Client::builder()
            .user_agent("betterbooks/1.0")
            .build()
            .expect("Failed to build HTTP client");
        Self {
            http_client,
            base_url,
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Override the connectivity check deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Verify that an API key can reach the gateway for an environment.
    ///
    /// Posts an empty validation payload and classifies the result; the
    /// gateway's answer to the payload itself is irrelevant, only whether
    /// the key was accepted. No retry is performed at this layer.
    pub async fn test_connection(
        &self,
        api_key: &str,
        environment: FbrEnvironment,
    ) -> ConnectionOutcome {
        let url = format!("{}/{}", self.base_url, validation_path(environment));
        let request = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&json!({}));

        let response = match tokio::time::timeout(self.deadline, request.send()).await {
            Err(_) => return ConnectionOutcome::TimedOut,
            Ok(Err(e)) if e.is_timeout() => return ConnectionOutcome::TimedOut,
            Ok(Err(e)) => return ConnectionOutcome::NetworkError(e.to_string()),
            Ok(Ok(response)) => response,
        };

        match response.status() {
            StatusCode::UNAUTHORIZED => ConnectionOutcome::InvalidKey,
            StatusCode::FORBIDDEN => ConnectionOutcome::NotAuthorized,
            s if s.is_success() => ConnectionOutcome::Connected,
            s => ConnectionOutcome::NetworkError(format!("unexpected gateway status {}", s)),
        }
    }
}

impl Default for FbrClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Environment-specific validation endpoint path.
fn validation_path(environment: FbrEnvironment) -> &'static str {
    match environment {
        FbrEnvironment::Sandbox => "di_data/v1/di/validateinvoicedata_sb",
        FbrEnvironment::Production => "di_data/v1/di/validateinvoicedata",
    }
}
