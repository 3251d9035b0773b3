//! Login and logout

use crate::http::{AuthorizedClient, Method, Reply};
use boxtrack_core::{Error, FieldErrors, LoginRequest, LoginTokens, RefreshRequest, Result};
use serde_json::Value;
use tracing::{info, warn};

pub const LOGIN_PATH: &str = "auth/login/";
pub const LOGOUT_PATH: &str = "auth/logout/";

/// Log in and, on success, establish the session.
///
/// A rejected login is not an error: the reply carries the backend's
/// message and field errors, and nothing is stored.
pub async fn login(client: &AuthorizedClient, username: &str, password: &str) -> Result<Reply<LoginTokens>> {
    let mut errors = FieldErrors::new();
    if username.trim().is_empty() {
        errors.insert("username", "Username is required.");
    }
    if password.is_empty() {
        errors.insert("password", "Password is required.");
    }
    if !errors.is_empty() {
        return Err(Error::ValidationFailure(errors));
    }

    let body = serde_json::to_value(LoginRequest {
        username: username.trim().to_string(),
        password: password.to_string(),
    })?;
    let response = client.call_public(Method::POST, LOGIN_PATH, Some(body)).await?;
    let reply: Reply<LoginTokens> = Reply::decode(response)?;

    match (reply.success, &reply.data) {
        (true, Some(tokens)) => {
            client.session().establish(tokens.clone().into()).await?;
            info!("Logged in as {}", username.trim());
        }
        (true, None) => {
            return Err(Error::InvalidData("Login reply carried no tokens".to_string()));
        }
        _ => warn!("Login rejected with status {}", reply.status),
    }
    Ok(reply)
}

/// Revoke the refresh token and end the session.
///
/// The session ends once the backend answers, whatever the status. A call
/// that never got an answer leaves the session in place.
pub async fn logout(client: &AuthorizedClient) -> Result<Reply<Value>> {
    let Some(credentials) = client.session().credentials().await? else {
        return Err(Error::Unauthenticated);
    };

    let body = serde_json::to_value(RefreshRequest {
        refresh: credentials.refresh_token,
    })?;
    let response = client.call(Method::POST, LOGOUT_PATH, Some(body)).await?;

    client.session().teardown().await?;
    if !response.is_success() {
        warn!("Logout answered with status {}", response.status);
    }
    Reply::decode(response)
}
