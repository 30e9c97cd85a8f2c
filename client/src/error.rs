//! Error types shared by the request client, session store, and forms.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses become [`ApiError::Status`] carrying the decoded body so
//! screens can surface the server-provided `message` field, falling back to a
//! caller-chosen string when the server sent none.

use serde_json::Value;
use validator::ValidationErrors;

use crate::storage::StorageError;

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Errors produced by API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("API request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("API response error: status {status}")]
    Status {
        status: u16,
        /// Server-provided `message` field, when present.
        message: Option<String>,
        body: Value,
    },

    /// A request body could not be serialized.
    #[error("request encode failed: {0}")]
    Encode(String),

    /// A response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// Persisting session or token state failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_API_REQUEST",
            Self::Status { .. } => "E_API_STATUS",
            Self::Encode(_) => "E_API_ENCODE",
            Self::Decode(_) => "E_API_DECODE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Storage(_) => "E_STORAGE",
        }
    }

    /// HTTP status of the failed response, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Message to show a user: the server's `message` field or `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status { message: Some(message), .. } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_owned(),
        }
    }
}

/// Client-side form validation failure, raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Field that failed first in form order.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        "E_VALIDATION"
    }

    #[must_use]
    pub fn new(field: &str, message: &str) -> Self {
        Self { field: field.to_owned(), message: message.to_owned() }
    }

    /// Pick the first failing field following `field_order`, the order the
    /// form presents its inputs in.
    #[must_use]
    pub fn first_of(errors: &ValidationErrors, field_order: &[&str]) -> Self {
        let field_errors = errors.field_errors();
        let ordered = field_order
            .iter()
            .filter_map(|field| field_errors.get(*field).map(|errs| ((*field).to_owned(), *errs)));
        let unordered = field_errors.iter().map(|(field, errs)| (field.to_string(), *errs));

        ordered
            .chain(unordered)
            .find_map(|(field, errs)| {
                errs.first().map(|error| {
                    let message = error
                        .message
                        .as_ref()
                        .map_or_else(|| format!("{field} is invalid"), ToString::to_string);
                    Self { field: field.clone(), message }
                })
            })
            .unwrap_or_else(|| Self::new("form", "Invalid form"))
    }
}
