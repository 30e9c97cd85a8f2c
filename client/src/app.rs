//! Application wiring.
//!
//! SYSTEM CONTEXT
//! ==============
//! One [`AppContext`] per process. It owns the persistence port, the session
//! store, the navigator, and the authenticated request client, and connects
//! them: the client reads tokens from the same store the session writes, and
//! reports unrecoverable auth failures to the navigator.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::net::client::ApiClient;
use crate::net::tokens::TokenStore;
use crate::net::transport::{HttpTransport, Transport};
use crate::net::types::User;
use crate::state::router::{Navigator, Route};
use crate::state::session::SessionStore;
use crate::storage::{FileStore, KeyValueStore};

pub struct AppContext {
    pub storage: Arc<dyn KeyValueStore>,
    pub session: Arc<SessionStore>,
    pub navigator: Arc<Navigator>,
    pub api: ApiClient,
}

impl AppContext {
    /// Wire the real HTTP transport and the state file from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(config)?;
        let store = FileStore::new(&config.state_file);
        tracing::debug!(api_url = transport.base_url(), state_file = %store.path().display(), "app context");
        Ok(Self::with_parts(Arc::new(store), Arc::new(transport)))
    }

    #[must_use]
    pub fn with_parts(storage: Arc<dyn KeyValueStore>, transport: Arc<dyn Transport>) -> Self {
        let session = Arc::new(SessionStore::new(storage.clone()));
        let navigator = Arc::new(Navigator::new(session.clone()));
        let api = ApiClient::authenticated(transport, TokenStore::new(storage.clone()), navigator.clone());
        Self { storage, session, navigator, api }
    }

    /// Sign in and move to the dashboard.
    ///
    /// # Errors
    ///
    /// Returns the login call's error; the location is unchanged.
    pub async fn login(&self, username: &str, password: &str) -> Result<Route, ApiError> {
        self.session.login(&self.api, username, password).await?;
        Ok(self.navigator.navigate(Route::Dashboard.path()))
    }

    /// Sign out and move to the login screen.
    pub async fn logout(&self) -> Route {
        self.session.logout(&self.api).await;
        self.navigator.navigate(Route::Login.path())
    }

    /// Re-read the profile from `/auth/me` and store it on the session.
    ///
    /// # Errors
    ///
    /// Returns the API error or a decode/storage failure.
    pub async fn refresh_profile(&self) -> Result<User, ApiError> {
        let user: User = self.api.auth().current_user().await?.json()?;
        self.session.set_user(user.clone())?;
        Ok(user)
    }
}
