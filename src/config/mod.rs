//! Environment-driven service configuration, read once at startup.

/// Complete BetterBooks credential service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP API binds to
    pub api_port: u16,
    /// Path to the SQLite credentials database
    pub credentials_db: String,
    /// Secret the credential sealing key is derived from. When unset the
    /// credential endpoints are disabled.
    pub credential_secret: Option<String>,
    /// FBR gateway base URL
    pub fbr_base_url: String,
    /// Deadline for an FBR connectivity check, in seconds
    pub fbr_timeout_secs: u64,
    /// Whether bearer-token user identification is required
    pub auth_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_port: 3000,
            credentials_db: "credentials.db".to_string(),
            credential_secret: None,
            fbr_base_url: "https://gw.fbr.gov.pk".to_string(),
            fbr_timeout_secs: 30,
            auth_enabled: true,
        }
    }
}

impl Config {
    /// Build from env vars, falling back to defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("BETTERBOOKS_API_PORT") {
            if let Ok(n) = v.parse::<u16>() {
                cfg.api_port = n;
            }
        }
        if let Ok(v) = std::env::var("BETTERBOOKS_CREDENTIALS_DB") {
            if !v.is_empty() {
                cfg.credentials_db = v;
            }
        }
        // Empty secret counts as unset; derive_key would reject it anyway
        if let Ok(v) = std::env::var("BETTERBOOKS_CREDENTIAL_SECRET") {
            if !v.is_empty() {
                cfg.credential_secret = Some(v);
            }
        }
        if let Ok(v) = std::env::var("BETTERBOOKS_FBR_BASE_URL") {
            if !v.is_empty() {
                cfg.fbr_base_url = v;
            }
        }
        if let Ok(v) = std::env::var("BETTERBOOKS_FBR_TIMEOUT_SECS") {
            if let Ok(n) = v.parse::<u64>() {
                cfg.fbr_timeout_secs = n;
            }
        }
        if let Ok(v) = std::env::var("BETTERBOOKS_AUTH_ENABLED") {
            if let Ok(b) = v.parse::<bool>() {
                cfg.auth_enabled = b;
            }
        }

        cfg
    }
}
