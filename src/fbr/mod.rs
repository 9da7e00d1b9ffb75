//! FBR (Federal Board of Revenue) gateway integration.
//!
//! The gateway is treated as an opaque upstream: the only operation this
//! service performs against it is a bounded connectivity check with a
//! caller-supplied API key.

mod client;

pub use client::{ConnectionOutcome, FbrClient};

use serde::{Deserialize, Serialize};

/// FBR deployment environment a credential is enrolled against.
///
/// Serialized as lowercase strings at the HTTP boundary and in the
/// credentials table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FbrEnvironment {
    Sandbox,
    Production,
}

impl FbrEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            FbrEnvironment::Sandbox => "sandbox",
            FbrEnvironment::Production => "production",
        }
    }

    /// Parses the lowercase wire/column form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sandbox" => Some(FbrEnvironment::Sandbox),
            "production" => Some(FbrEnvironment::Production),
            _ => None,
        }
    }
}

impl std::fmt::Display for FbrEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for env in [FbrEnvironment::Sandbox, FbrEnvironment::Production] {
            assert_eq!(FbrEnvironment::parse(env.as_str()), Some(env));
        }
        assert_eq!(FbrEnvironment::parse("staging"), None);
        assert_eq!(FbrEnvironment::parse("Sandbox"), None);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&FbrEnvironment::Production).unwrap();
        assert_eq!(json, "\"production\"");

        let parsed: FbrEnvironment = serde_json::from_str("\"sandbox\"").unwrap();
        assert_eq!(parsed, FbrEnvironment::Sandbox);
    }
}
