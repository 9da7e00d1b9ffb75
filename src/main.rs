use anyhow::{Context, Result};
use betterbooks::api::{create_credential_router, CredentialAppState};
use betterbooks::config::Config;
use betterbooks::credentials::CredentialStore;
use betterbooks::fbr::FbrClient;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "betterbooks=info".into()),
        )
        .init();

    info!("BetterBooks credential service starting...");

    let config = Config::from_env();
    info!(
        api_port = config.api_port,
        credentials_db = %config.credentials_db,
        fbr_base_url = %config.fbr_base_url,
        fbr_timeout_secs = config.fbr_timeout_secs,
        auth_enabled = config.auth_enabled,
        "Configuration loaded"
    );

    // The secret itself is never logged
    let credential_store = match &config.credential_secret {
        Some(secret) => {
            let store = CredentialStore::new(&config.credentials_db, secret)
                .context("Failed to initialize credential store")?;
            info!("Credential store initialized");
            Some(Arc::new(store))
        }
        None => {
            warn!("BETTERBOOKS_CREDENTIAL_SECRET not set; credential endpoints disabled");
            None
        }
    };

    let fbr_client = Arc::new(
        FbrClient::with_base_url(config.fbr_base_url.clone())
            .with_deadline(Duration::from_secs(config.fbr_timeout_secs)),
    );

    let state = CredentialAppState {
        credential_store,
        fbr_client,
        auth_enabled: config.auth_enabled,
    };
    // Browser frontend calls this API cross-origin
    let router = create_credential_router(state).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.api_port))
        .await
        .context("Failed to bind API port")?;
    info!(port = config.api_port, "Credential API listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "API server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    server_handle.abort();
    info!("BetterBooks credential service stopped");

    Ok(())
}
