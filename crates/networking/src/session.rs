//! The signed-in session and route gating

use boxtrack_core::{Credentials, Result};
use boxtrack_persistence::CredentialStore;
use std::sync::{Arc, RwLock};
use tracing::{info, instrument};

/// Where the user is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Unauthenticated entry point
    Login,
    Dashboard,
}

/// Owns the credential store and the current route.
///
/// Shared by `Arc` between the client and the dashboard; whoever hits an
/// unusable session calls [`Session::teardown`].
pub struct Session {
    store: Arc<dyn CredentialStore>,
    route: RwLock<Route>,
}

impl Session {
    /// A session positioned at the login entry point
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            route: RwLock::new(Route::Login),
        }
    }

    /// A session positioned wherever the stored tokens allow
    pub async fn restore(store: Arc<dyn CredentialStore>) -> Result<Self> {
        let session = Self::new(store);
        session.resolve(Route::Dashboard).await?;
        Ok(session)
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn route(&self) -> Route {
        self.route.read().map(|r| *r).unwrap_or(Route::Login)
    }

    fn set_route(&self, route: Route) {
        if let Ok(mut current) = self.route.write() {
            *current = route;
        }
    }

    /// Stored pair; `None` without a refresh token
    pub async fn credentials(&self) -> Result<Option<Credentials>> {
        self.store.load().await
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        self.store.has_refresh_token().await
    }

    /// Navigate to `requested`, redirected by whether a refresh token exists
    pub async fn resolve(&self, requested: Route) -> Result<Route> {
        let authenticated = self.is_authenticated().await?;
        let route = match (requested, authenticated) {
            (Route::Login, true) => Route::Dashboard,
            (Route::Dashboard, false) => Route::Login,
            (requested, _) => requested,
        };
        self.set_route(route);
        Ok(route)
    }

    /// Persist a freshly issued pair and enter the dashboard
    #[instrument(skip_all)]
    pub async fn establish(&self, credentials: Credentials) -> Result<()> {
        self.store.save(&credentials).await?;
        self.set_route(Route::Dashboard);
        info!("Session established");
        Ok(())
    }

    /// Forget the tokens and return to the login entry point
    #[instrument(skip_all)]
    pub async fn teardown(&self) -> Result<()> {
        self.set_route(Route::Login);
        self.store.clear().await?;
        info!("Session ended");
        Ok(())
    }
}
