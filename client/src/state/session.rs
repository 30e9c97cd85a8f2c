//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Owned by `AppContext` and shared as `Arc<SessionStore>`. Route guards read
//! `is_authenticated`; screens call the role/permission predicates; the
//! navigator calls `clear_auth` when the request client gives up on a
//! session. The store never holds its lock across a network call.
//!
//! PERSISTENCE
//! ===========
//! `user`, both tokens and `is_authenticated` are saved as one JSON record
//! under [`SESSION_STORAGE_KEY`]. The token pair is additionally written to
//! its own keys, which is where the request client reads it from. A refresh
//! rotates only that pair, so the session's own token copies can lag behind;
//! logout reads the live refresh token from the pair.
//! `is_loading` is never persisted.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::net::client::ApiClient;
use crate::net::tokens::TokenStore;
use crate::net::types::{AuthTokens, LoginResponse, User};
use crate::storage::{self, KeyValueStore, StorageError};

pub const SESSION_STORAGE_KEY: &str = "auth-storage";

/// Snapshot of the session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// True iff `user` and both tokens are present.
    pub is_authenticated: bool,
    /// True only while a login call is in flight.
    pub is_loading: bool,
}

impl Session {
    fn authenticated(user: User, tokens: AuthTokens) -> Self {
        Self {
            user: Some(user),
            access_token: Some(tokens.access_token),
            refresh_token: Some(tokens.refresh_token),
            is_authenticated: true,
            is_loading: false,
        }
    }

    fn has_credentials(&self) -> bool {
        self.user.is_some() && self.access_token.is_some() && self.refresh_token.is_some()
    }

    fn grants(&self, check: impl FnOnce(&User) -> bool) -> bool {
        match &self.user {
            None => false,
            Some(user) if user.is_global_admin => true,
            Some(user) => check(user),
        }
    }
}

/// The persisted subset of [`Session`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedSession {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_authenticated: bool,
}

impl From<&Session> for PersistedSession {
    fn from(session: &Session) -> Self {
        Self {
            user: session.user.clone(),
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            is_authenticated: session.is_authenticated,
        }
    }
}

impl From<PersistedSession> for Session {
    fn from(persisted: PersistedSession) -> Self {
        let mut session = Self {
            user: persisted.user,
            access_token: persisted.access_token,
            refresh_token: persisted.refresh_token,
            is_authenticated: false,
            is_loading: false,
        };
        session.is_authenticated = persisted.is_authenticated && session.has_credentials();
        if !session.is_authenticated {
            session = Self::default();
        }
        session
    }
}

pub struct SessionStore {
    state: Mutex<Session>,
    storage: Arc<dyn KeyValueStore>,
    tokens: TokenStore,
}

impl SessionStore {
    /// Create the store, rehydrating any session persisted in `storage`.
    ///
    /// An unreadable or inconsistent record starts an empty session.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let session = match storage::load_json::<PersistedSession>(storage.as_ref(), SESSION_STORAGE_KEY) {
            Ok(Some(persisted)) => Session::from(persisted),
            Ok(None) => Session::default(),
            Err(error) => {
                tracing::warn!(%error, "discarding unreadable persisted session");
                Session::default()
            }
        };
        if session.is_authenticated {
            tracing::debug!("session rehydrated");
        }
        let tokens = TokenStore::new(storage.clone());
        Self { state: Mutex::new(session), storage, tokens }
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    /// Sign in and replace the whole session on success.
    ///
    /// # Errors
    ///
    /// Returns the login call's error, or a storage error if the new session
    /// cannot be persisted. On error the session is left as it was, apart
    /// from `is_loading` going back to false.
    pub async fn login(&self, api: &ApiClient, username: &str, password: &str) -> Result<(), ApiError> {
        self.lock().is_loading = true;

        let result = async {
            let LoginResponse { user, tokens } = api.auth().login(username, password).await?.json()?;
            self.tokens.store(&tokens)?;
            Ok::<_, ApiError>(Session::authenticated(user, tokens))
        }
        .await;

        match result {
            Ok(session) => {
                if let Err(error) = self.persist(&session) {
                    tracing::warn!(%error, "failed to persist session after login");
                }
                tracing::info!(username, "logged in");
                *self.lock() = session;
                Ok(())
            }
            Err(error) => {
                self.lock().is_loading = false;
                tracing::info!(username, %error, "login failed");
                Err(error)
            }
        }
    }

    /// Best-effort server-side logout, then an unconditional local clear.
    pub async fn logout(&self, api: &ApiClient) {
        let refresh_token = self.tokens.refresh_token().or_else(|| self.lock().refresh_token.clone());
        if let Some(refresh_token) = refresh_token {
            if let Err(error) = api.auth().logout(Some(&refresh_token)).await {
                tracing::warn!(%error, "server logout failed; clearing local session anyway");
            }
        }
        self.clear_auth();
        tracing::info!("logged out");
    }

    /// Drop the session and stored tokens without touching the network.
    pub fn clear_auth(&self) {
        self.tokens.clear();
        let cleared = {
            let mut state = self.lock();
            *state = Session { is_loading: state.is_loading, ..Session::default() };
            state.clone()
        };
        if let Err(error) = self.persist(&cleared) {
            tracing::warn!(%error, "failed to persist cleared session");
        }
    }

    /// Replace the signed-in user's profile. Ignored while signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated session cannot be persisted.
    pub fn set_user(&self, user: User) -> Result<(), StorageError> {
        let updated = {
            let mut state = self.lock();
            if !state.is_authenticated {
                return Ok(());
            }
            state.user = Some(user);
            state.clone()
        };
        self.persist(&updated)
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.lock().grants(|user| user.roles.iter().any(|r| r == role))
    }

    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.lock().grants(|user| user.permissions.iter().any(|p| p == permission))
    }

    fn persist(&self, session: &Session) -> Result<(), StorageError> {
        storage::save_json(self.storage.as_ref(), SESSION_STORAGE_KEY, &PersistedSession::from(session))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Session> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
