//! Authentication models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Access/refresh token pair.
///
/// The access token is short-lived and attached to every protected call;
/// the refresh token is only ever used to mint a new access token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Tokens never reach logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Body of POST /auth/login/
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `data` of a successful login
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginTokens {
    pub access: String,
    pub refresh: String,
}

impl From<LoginTokens> for Credentials {
    fn from(tokens: LoginTokens) -> Self {
        Credentials::new(tokens.access, tokens.refresh)
    }
}

impl fmt::Debug for LoginTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LoginTokens(<redacted>)")
    }
}

/// Body of POST /auth/token/refresh/ and POST /auth/logout/
#[derive(Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Response of POST /auth/token/refresh/ (not wrapped in the usual envelope)
#[derive(Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}
