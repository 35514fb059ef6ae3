use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;

use crate::{error::ApiError, AppState};

/// Decides whether a username/password pair is accepted.
pub trait CredentialVerifier: Send + Sync {
    /// Return `true` when the pair is valid.
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// A single fixed account.
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    /// Accept exactly `username` with `password`.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        // both comparisons always run
        let user_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let password_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        user_ok & password_ok
    }
}

/// Rejects every credential.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl CredentialVerifier for DenyAll {
    fn verify(&self, _username: &str, _password: &str) -> bool {
        false
    }
}

/// Compare two byte strings in time that depends only on their lengths.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let mut diff = a.len() ^ b.len();
    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= (x ^ y) as usize;
    }
    diff == 0
}

/// Parse an `Authorization: Basic <base64(user:password)>` header value.
pub fn parse_basic_credentials(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// The username of a request that passed basic authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some((username, password)) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_basic_credentials)
        else {
            log::warn!("Rejected request to {} without credentials", parts.uri.path());
            return Err(ApiError::MissingCredentials);
        };

        if !state.verifier.verify(&username, &password) {
            log::warn!("Rejected credentials for user '{username}'");
            return Err(ApiError::InvalidCredentials);
        }

        Ok(AuthenticatedUser(username))
    }
}

/// Reply of `GET /api/protected`.
#[derive(Debug, Serialize)]
pub struct ProtectedResponse {
    /// Greeting for the authenticated user.
    pub message: String,
}

/// Handler for `GET /api/protected`.
pub async fn protected(AuthenticatedUser(username): AuthenticatedUser) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: format!("Hello, {username}. You are authenticated."),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_credentials() {
        let verifier = StaticCredentials::new("admin", "s3cret");
        assert!(verifier.verify("admin", "s3cret"));
        assert!(!verifier.verify("admin", "s3cre"));
        assert!(!verifier.verify("admin", "s3cret!"));
        assert!(!verifier.verify("root", "s3cret"));
        assert!(!verifier.verify("", ""));
    }

    #[test]
    fn test_debug_hides_password() {
        let verifier = StaticCredentials::new("admin", "s3cret");
        assert!(!format!("{verifier:?}").contains("s3cret"));
    }

    #[test]
    fn test_deny_all() {
        assert!(!DenyAll.verify("admin", "anything"));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"", b""));
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abc\0"));
    }

    #[test]
    fn test_parse_basic_credentials() {
        let encoded = STANDARD.encode("admin:pass:word");
        assert_eq!(
            parse_basic_credentials(&format!("Basic {encoded}")),
            Some(("admin".to_string(), "pass:word".to_string()))
        );
        assert_eq!(
            parse_basic_credentials(&format!("basic {encoded}")),
            Some(("admin".to_string(), "pass:word".to_string()))
        );
        assert_eq!(parse_basic_credentials(&format!("Bearer {encoded}")), None);
        assert_eq!(parse_basic_credentials("Basic not-base64!"), None);
        assert_eq!(
            parse_basic_credentials(&format!("Basic {}", STANDARD.encode("nocolon"))),
            None
        );
    }
}
