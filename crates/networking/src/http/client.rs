//! Boxtrack HTTP client with bearer-token authentication
//!
//! Every protected call renews the session first, then attaches the current
//! access token. Non-2xx statuses come back as data so forms can show the
//! backend's field errors.

use super::reply::Reply;
use super::transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
use crate::refresh::{Freshness, SessionRefresher};
use crate::session::Session;
use boxtrack_core::{Config, Error, RefreshPolicy, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Client for the Boxtrack backend, bound to one [`Session`]
pub struct AuthorizedClient {
    session: Arc<Session>,
    transport: Arc<dyn Transport>,
    refresher: SessionRefresher,
}

impl AuthorizedClient {
    pub fn new(session: Arc<Session>, transport: Arc<dyn Transport>, policy: RefreshPolicy) -> Self {
        let refresher = SessionRefresher::new(session.clone(), transport.clone(), policy);
        Self {
            session,
            transport,
            refresher,
        }
    }

    /// Client over HTTP with the configured base URL, timeout and refresh policy
    pub fn from_config(config: &Config, session: Arc<Session>) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(config)?);
        Ok(Self::new(session, transport, config.refresh_policy))
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Protected call.
    ///
    /// Renews the session first. When that reports `Unauthenticated` the
    /// session is torn down and nothing is sent. Without any stored session
    /// the call fails with `Unauthenticated` before sending.
    #[instrument(skip(self, body))]
    pub async fn call(&self, method: Method, path: &str, body: Option<Value>) -> Result<ApiResponse> {
        let freshness = match self.refresher.ensure_fresh().await {
            Ok(freshness) => freshness,
            Err(Error::Unauthenticated) => {
                warn!("Session is no longer usable, returning to login");
                if let Err(e) = self.session.teardown().await {
                    error!("Failed to clear credentials: {}", e);
                }
                return Err(Error::Unauthenticated);
            }
            Err(e) => return Err(e),
        };
        if freshness == Freshness::AtEntryPoint {
            // Nothing to authorize with; already at login, so no teardown
            debug!("Refusing {} {} without a session", method, path);
            return Err(Error::Unauthenticated);
        }

        let mut request = ApiRequest::new(method.clone(), path);
        let access = self
            .session
            .credentials()
            .await?
            .map(|c| c.access_token)
            .filter(|token| !token.is_empty());
        if let Some(token) = access {
            request = request.with_bearer(token);
        }
        if let Some(body) = body {
            request = request.with_body(body);
        }

        let response = self.transport.send(request).await?;
        debug!("{} {} -> {}", method, path, response.status);
        Ok(response)
    }

    /// Call without any credential (login)
    #[instrument(skip(self, body))]
    pub async fn call_public(&self, method: Method, path: &str, body: Option<Value>) -> Result<ApiResponse> {
        let mut request = ApiRequest::new(method.clone(), path);
        if let Some(body) = body {
            request = request.with_body(body);
        }
        let response = self.transport.send(request).await?;
        debug!("{} {} (public) -> {}", method, path, response.status);
        Ok(response)
    }

    /// Protected call decoded into the reply envelope
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Reply<T>> {
        let response = self.call(method, path, body).await?;
        Reply::decode(response)
    }
}
