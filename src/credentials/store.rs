//! Encrypted FBR credential storage backed by SQLite.
//!
//! Stores one API key per (user, environment) pair. Keys are sealed with
//! the envelope before they touch the database and unsealed only on read.

use super::envelope;
use crate::fbr::FbrEnvironment;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// Encrypted credential storage.
///
/// # Schema
/// ```sql
/// CREATE TABLE fbr_credentials (
///     id INTEGER PRIMARY KEY,
///     user_id TEXT NOT NULL,
///     environment TEXT NOT NULL,  -- 'sandbox' | 'production'
///     api_key TEXT NOT NULL,      -- envelope token (nonce:ciphertext:tag)
///     created_at TEXT NOT NULL,   -- ISO 8601 timestamp
///     updated_at TEXT NOT NULL,   -- ISO 8601 timestamp
///     UNIQUE(user_id, environment)
/// );
/// ```
///
/// # Security
/// - The api_key column only ever holds envelope tokens
/// - The sealing key is derived once at construction and kept in memory only
/// - SQLite ACID guarantees prevent partial updates
///
/// # Thread Safety
/// - Connection is wrapped in Mutex for safe concurrent access
pub struct CredentialStore {
    conn: Mutex<Connection>,
    key: [u8; envelope::KEY_SIZE],
}

impl CredentialStore {
    /// Creates or opens a credential store.
    ///
    /// # Arguments
    /// * `db_path` - Path to SQLite database file
    /// * `secret` - Credential secret from process configuration
    ///
    /// # Errors
    /// Fails fast when the secret is missing/empty, before any database
    /// or cryptographic work, or when the database cannot be opened.
    pub fn new<P: AsRef<Path>>(db_path: P, secret: &str) -> Result<Self> {
        let key = envelope::derive_key(secret).context("Invalid credential secret")?;

        let conn = Connection::open(db_path).context("Failed to open database")?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS fbr_credentials (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL,
                environment TEXT NOT NULL,
                api_key TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(user_id, environment)
            )
            "#,
            [],
        )
        .context("Failed to create fbr_credentials table")?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_user_environment
             ON fbr_credentials(user_id, environment)",
            [],
        )
        .context("Failed to create index")?;

        Ok(Self {
            conn: Mutex::new(conn),
            key,
        })
    }

    /// Stores an API key for a user and environment.
    ///
    /// Re-submitting replaces the previous key (upsert).
    pub fn store(
        &self,
        user_id: &str,
        environment: FbrEnvironment,
        api_key: &str,
    ) -> Result<()> {
        let token = envelope::encrypt(api_key, &self.key).context("Failed to encrypt API key")?;
        let now = Utc::now().to_rfc3339();

        self.conn
            .lock()
            .unwrap()
            .execute(
                r#"
                INSERT INTO fbr_credentials (user_id, environment, api_key, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(user_id, environment) DO UPDATE SET
                    api_key = excluded.api_key,
                    updated_at = excluded.updated_at
                "#,
                params![user_id, environment.as_str(), token, now, now],
            )
            .context("Failed to store credential")?;

        Ok(())
    }

    /// Retrieves and unseals the API key for a user and environment.
    ///
    /// # Returns
    /// * `Ok(Some(key))` - Credential found and decrypted
    /// * `Ok(None)` - No credential stored
    /// * `Err` - Database failure, or the stored token is malformed or
    ///   fails its integrity check (wrong secret, tampered row)
    pub fn get(&self, user_id: &str, environment: FbrEnvironment) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let token: Option<String> = conn
            .query_row(
                "SELECT api_key FROM fbr_credentials WHERE user_id = ?1 AND environment = ?2",
                params![user_id, environment.as_str()],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query credential")?;

        match token {
            Some(token) => {
                let api_key = envelope::decrypt(&token, &self.key)
                    .context("Failed to decrypt stored API key")?;
                Ok(Some(api_key))
            }
            None => Ok(None),
        }
    }

    /// Whether a credential is stored for a user and environment.
    ///
    /// Does not touch the envelope; a row that would fail decryption
    /// still counts as present.
    pub fn exists(&self, user_id: &str, environment: FbrEnvironment) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM fbr_credentials WHERE user_id = ?1 AND environment = ?2",
                params![user_id, environment.as_str()],
                |row| row.get(0),
            )
            .context("Failed to query credential")?;
        Ok(count > 0)
    }

    /// Lists the environments a user has stored credentials for.
    pub fn list_by_user(&self, user_id: &str) -> Result<Vec<FbrEnvironment>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT environment FROM fbr_credentials WHERE user_id = ?1 ORDER BY environment",
            )
            .context("Failed to prepare query")?;

        let names = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))
            .context("Failed to execute query")?
            .collect::<Result<Vec<String>, _>>()
            .context("Failed to read results")?;

        names
            .iter()
            .map(|name| {
                FbrEnvironment::parse(name)
                    .with_context(|| format!("Unknown environment '{}' in credentials table", name))
            })
            .collect()
    }

    /// Deletes the credential for a user and environment.
    ///
    /// # Returns
    /// * `Ok(true)` - Credential deleted
    /// * `Ok(false)` - No credential found
    pub fn delete(&self, user_id: &str, environment: FbrEnvironment) -> Result<bool> {
        let rows_affected = self
            .conn
            .lock()
            .unwrap()
            .execute(
                "DELETE FROM fbr_credentials WHERE user_id = ?1 AND environment = ?2",
                params![user_id, environment.as_str()],
            )
            .context("Failed to delete credential")?;

        Ok(rows_affected > 0)
    }
}
