//! Access token renewal ahead of protected calls

use crate::http::{rejection_message, ApiRequest, Method, Transport};
use crate::session::{Route, Session};
use base64::{engine::general_purpose, Engine as _};
use boxtrack_core::{Error, FieldErrors, RefreshPolicy, RefreshRequest, RefreshResponse, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

pub const REFRESH_PATH: &str = "auth/token/refresh/";

/// Outcome of [`SessionRefresher::ensure_fresh`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// A new access token was stored
    Renewed,
    /// The stored access token is still good for longer than the skew
    StillValid,
    /// No session, but the caller is already at the login entry point
    AtEntryPoint,
}

/// Renews the access token before each protected call
pub struct SessionRefresher {
    session: Arc<Session>,
    transport: Arc<dyn Transport>,
    policy: RefreshPolicy,
    in_flight: Mutex<()>,
}

impl SessionRefresher {
    pub fn new(session: Arc<Session>, transport: Arc<dyn Transport>, policy: RefreshPolicy) -> Self {
        Self {
            session,
            transport,
            policy,
            in_flight: Mutex::new(()),
        }
    }

    /// Make sure the stored access token is usable.
    ///
    /// Fails with `Unauthenticated` when no refresh token is stored, unless
    /// the session is already at the login entry point. Never clears
    /// credentials itself.
    #[instrument(skip(self))]
    pub async fn ensure_fresh(&self) -> Result<Freshness> {
        let Some(credentials) = self.session.credentials().await? else {
            if self.session.route() == Route::Login {
                debug!("No session at the login entry point");
                return Ok(Freshness::AtEntryPoint);
            }
            warn!("No refresh token stored");
            return Err(Error::Unauthenticated);
        };

        match self.policy {
            RefreshPolicy::Always => {
                self.renew(&credentials.refresh_token).await?;
                Ok(Freshness::Renewed)
            }
            RefreshPolicy::OnExpiry { skew } => {
                if !needs_renewal(&credentials.access_token, skew) {
                    return Ok(Freshness::StillValid);
                }

                let _guard = self.in_flight.lock().await;

                // Another caller may have renewed while we waited
                let Some(current) = self.session.credentials().await? else {
                    return Err(Error::Unauthenticated);
                };
                if !needs_renewal(&current.access_token, skew) {
                    debug!("Access token renewed by a concurrent call");
                    return Ok(Freshness::StillValid);
                }

                self.renew(&current.refresh_token).await?;
                Ok(Freshness::Renewed)
            }
        }
    }

    async fn renew(&self, refresh_token: &str) -> Result<()> {
        let body = serde_json::to_value(RefreshRequest {
            refresh: refresh_token.to_string(),
        })?;
        let request = ApiRequest::new(Method::POST, REFRESH_PATH)
            .with_bearer(refresh_token)
            .with_body(body);

        let response = self.transport.send(request).await?;

        if response.status == 401 {
            warn!("Refresh token rejected by backend");
            return Err(Error::Unauthenticated);
        }
        if !response.is_success() {
            error!("Token refresh failed with status {}", response.status);
            return Err(Error::DomainRejection {
                status: response.status,
                message: rejection_message(&response.body),
                field_errors: FieldErrors::new(),
            });
        }

        let renewed: RefreshResponse = serde_json::from_value(response.body).map_err(|e| {
            error!("Failed to parse refresh response: {}", e);
            Error::InvalidData(e.to_string())
        })?;

        self.session
            .store()
            .replace_access_token(&renewed.access)
            .await?;
        info!("Access token renewed");
        Ok(())
    }
}

/// `exp` claim of a JWT, in seconds since the epoch. The signature is not checked.
pub fn access_token_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_i64()
}

fn needs_renewal(access_token: &str, skew: Duration) -> bool {
    let Some(expiry) = access_token_expiry(access_token) else {
        return true;
    };
    let now = chrono::Utc::now().timestamp();
    let skew = i64::try_from(skew.as_secs()).unwrap_or(i64::MAX);
    expiry.saturating_sub(now) <= skew
}
