//! Sign-in form.
//!
//! SYSTEM CONTEXT
//! ==============
//! Validates the two credentials locally, then hands them to
//! [`SessionStore::login`]. On success the caller lands on the dashboard.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use validator::Validate;

use crate::error::{ApiError, ValidationError};
use crate::net::client::ApiClient;
use crate::state::router::Route;
use crate::state::session::SessionStore;

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields.";
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid credentials. Please try again.";

#[derive(Clone, Debug, Default, PartialEq, Eq, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Please fill in all fields."))]
    pub username: String,
    #[validate(length(min = 1, message = "Please fill in all fields."))]
    pub password: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl LoginError {
    /// Text to show under the form.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Validation(error) => error.message.clone(),
            Self::Api(error) => error.user_message(LOGIN_FAILED_MESSAGE),
        }
    }
}

impl LoginForm {
    #[must_use]
    pub fn new(username: &str, password: &str) -> Self {
        Self { username: username.trim().to_owned(), password: password.to_owned() }
    }

    /// Local checks only; nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns the first missing field.
    pub fn check(&self) -> Result<(), ValidationError> {
        self.validate().map_err(|errors| ValidationError::first_of(&errors, &["username", "password"]))
    }

    /// Validate, then sign in through `session`.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any network call, or the login
    /// call's error.
    pub async fn submit(&self, session: &SessionStore, api: &ApiClient) -> Result<Route, LoginError> {
        self.check()?;
        session.login(api, &self.username, &self.password).await?;
        Ok(Route::Dashboard)
    }
}
