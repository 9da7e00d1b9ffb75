// HTTP API for FBR credential management

pub mod auth;
pub mod credentials;

pub use credentials::{create_credential_router, CredentialAppState};
