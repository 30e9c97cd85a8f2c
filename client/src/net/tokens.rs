//! The persisted access/refresh token pair.
//!
//! Written by the session store on login/logout and by the refresh layer on
//! refresh success/failure; read by the bearer layer before every call.

#[cfg(test)]
#[path = "tokens_test.rs"]
mod tokens_test;

use std::sync::Arc;

use super::types::AuthTokens;
use crate::storage::{KeyValueStore, StorageError};

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Current access token. Unreadable storage counts as no token.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY)
    }

    /// Current refresh token. Unreadable storage counts as no token.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    /// Persist a new token pair.
    ///
    /// A failed write clears both keys, so storage never holds half of a pair.
    ///
    /// # Errors
    ///
    /// Returns an error if either token cannot be written.
    pub fn store(&self, tokens: &AuthTokens) -> Result<(), StorageError> {
        let written = self
            .storage
            .save(ACCESS_TOKEN_KEY, &tokens.access_token)
            .and_then(|()| self.storage.save(REFRESH_TOKEN_KEY, &tokens.refresh_token));
        if written.is_err() {
            self.clear();
        }
        written
    }

    /// Remove both tokens. Failures are logged; clearing never fails.
    pub fn clear(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(error) = self.storage.remove(key) {
                tracing::warn!(%error, key, "failed to remove stored token");
            }
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.load(key) {
            Ok(value) => value.filter(|token| !token.is_empty()),
            Err(error) => {
                tracing::warn!(%error, key, "failed to read stored token");
                None
            }
        }
    }
}
