//! Encrypted storage for FBR API keys.
//!
//! Users submit their FBR sandbox/production API keys once; the service
//! keeps them sealed at rest and unseals them only at the moment of
//! outbound use (e.g. a gateway connectivity check).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │       CredentialStore                    │
//! │  - one key per (user, environment)       │
//! │  - transparent seal/unseal               │
//! └─────────────────────────────────────────┘
//!          ↓                    ↑
//!     (encrypt)            (decrypt)
//!          ↓                    ↑
//! ┌─────────────────────────────────────────┐
//! │       Envelope Module                    │
//! │  - AES-256-GCM, SHA-256 derived key      │
//! │  - unique nonce per token                │
//! └─────────────────────────────────────────┘
//!          ↓                    ↑
//! ┌─────────────────────────────────────────┐
//! │       SQLite Database                    │
//! │  - envelope tokens at rest               │
//! │  - ACID guarantees                       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use betterbooks::credentials::CredentialStore;
//! use betterbooks::fbr::FbrEnvironment;
//!
//! # fn main() -> anyhow::Result<()> {
//! let secret = std::env::var("BETTERBOOKS_CREDENTIAL_SECRET")?;
//! let store = CredentialStore::new("credentials.db", &secret)?;
//!
//! store.store("user1", FbrEnvironment::Sandbox, "sk_test_abc123")?;
//!
//! if let Some(api_key) = store.get("user1", FbrEnvironment::Sandbox)? {
//!     // forward api_key to the gateway; never log it
//! }
//!
//! store.delete("user1", FbrEnvironment::Sandbox)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Security
//!
//! - Keys are encrypted at rest with AES-256-GCM, one random nonce per token
//! - The sealing key is derived from a process-configuration secret with
//!   SHA-256 and never persisted
//! - Authenticated encryption: a tampered row fails decryption instead of
//!   yielding garbage
//! - Plaintext keys never appear in logs or API responses

mod envelope;
mod store;

pub use store::CredentialStore;

// Re-export the envelope transform for utilities and tests
pub use envelope::{decrypt, derive_key, encrypt, EnvelopeError};
