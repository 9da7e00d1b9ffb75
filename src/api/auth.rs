//! Bearer-token user identification for the credential API.
//!
//! The bearer token is the caller's user id, minted by the session layer
//! that fronts this service. With auth disabled (local development) every
//! request is attributed to the `default` user.

use axum::http::HeaderMap;

/// User identification errors
#[derive(Debug, PartialEq, Clone)]
pub enum AuthError {
    /// Authorization header not present
    Missing,
    /// Header is not "Bearer <token>" or the token is not a string
    InvalidFormat,
    /// Token is empty
    Empty,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Missing => write!(f, "Authorization token not provided"),
            AuthError::InvalidFormat => write!(f, "Invalid authorization token format"),
            AuthError::Empty => write!(f, "Authorization token is empty"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Resolve the calling user from request headers.
///
/// Returns the bearer token as the user id, or `default` when auth is
/// disabled.
pub fn identify_user(headers: &HeaderMap, auth_enabled: bool) -> Result<String, AuthError> {
    if !auth_enabled {
        return Ok("default".to_string());
    }

    let auth_header = headers
        .get("authorization")
        .ok_or(AuthError::Missing)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat)?;

    parse_bearer_token(auth_header)
}

/// Parse a bearer token out of an Authorization header value.
fn parse_bearer_token(header_value: &str) -> Result<String, AuthError> {
    let parts: Vec<&str> = header_value.splitn(2, ' ').collect();

    if parts.len() != 2 || !parts[0].eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidFormat);
    }

    let token = parts[1].trim();
    if token.is_empty() {
        return Err(AuthError::Empty);
    }

    Ok(token.to_string())
}
