//! Credential layers: bearer injection and the 401 refresh-and-retry policy.
//!
//! SYSTEM CONTEXT
//! ==============
//! Chain order is `TraceLayer -> BearerAuth -> TokenRefresh -> transport`.
//! `TokenRefresh` sits inside `BearerAuth`, so it sees the credential the
//! request actually carried, and its single retry goes straight to the
//! transport without passing through itself again.
//!
//! CONCURRENCY
//! ===========
//! Refreshes are single-flight. A request that hits 401 after another one
//! already rotated the pair (the stored access token no longer matches the
//! one it was sent with) retries with the current token instead of spending
//! the refresh token a second time.

#[cfg(test)]
#[path = "auth_layer_test.rs"]
mod auth_layer_test;

use std::sync::Arc;

use tokio::sync::Mutex;

use super::middleware::{Middleware, Next};
use super::tokens::TokenStore;
use super::transport::{ApiRequest, ApiResponse, Transport};
use super::types::{AuthTokens, RefreshRequest};
use crate::error::ApiError;

pub const REFRESH_PATH: &str = "/auth/refresh";

/// Sink for forced navigation to the login screen.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self);
}

// =============================================================================
// BEARER
// =============================================================================

/// Attaches the stored access token, when there is one.
pub struct BearerAuth {
    tokens: TokenStore,
}

impl BearerAuth {
    #[must_use]
    pub fn new(tokens: TokenStore) -> Self {
        Self { tokens }
    }
}

#[async_trait::async_trait]
impl Middleware for BearerAuth {
    async fn handle(&self, mut request: ApiRequest, next: Next<'_>) -> Result<ApiResponse, ApiError> {
        if let Some(token) = self.tokens.access_token() {
            request.bearer = Some(token);
        }
        next.run(request).await
    }
}

// =============================================================================
// REFRESH
// =============================================================================

/// Recovers from an expired access token with at most one refresh per call.
pub struct TokenRefresh {
    tokens: TokenStore,
    transport: Arc<dyn Transport>,
    redirect: Arc<dyn LoginRedirect>,
    in_flight: Mutex<()>,
}

impl TokenRefresh {
    /// `transport` is used bare for the refresh call itself.
    #[must_use]
    pub fn new(tokens: TokenStore, transport: Arc<dyn Transport>, redirect: Arc<dyn LoginRedirect>) -> Self {
        Self { tokens, transport, redirect, in_flight: Mutex::new(()) }
    }

    async fn recover(&self, mut request: ApiRequest, original: ApiError, next: Next<'_>) -> Result<ApiResponse, ApiError> {
        let access_token = {
            let _guard = self.in_flight.lock().await;

            let Some(refresh_token) = self.tokens.refresh_token() else {
                tracing::info!(path = %request.path, "unauthorized without refresh token; redirecting to login");
                self.redirect.redirect_to_login();
                return Err(original);
            };

            match self.tokens.access_token() {
                Some(current) if request.bearer.as_deref() != Some(current.as_str()) => {
                    tracing::debug!(path = %request.path, "token pair already rotated; retrying");
                    current
                }
                _ => match self.refresh(&refresh_token).await {
                    Ok(tokens) => {
                        if let Err(error) = self.tokens.store(&tokens) {
                            tracing::warn!(%error, "failed to persist refreshed tokens");
                        }
                        tracing::info!("access token refreshed");
                        tokens.access_token
                    }
                    Err(error) => {
                        tracing::warn!(%error, "token refresh rejected; clearing session");
                        self.tokens.clear();
                        self.redirect.redirect_to_login();
                        return Err(error);
                    }
                },
            }
        };

        request.bearer = Some(access_token);
        next.run(request).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens, ApiError> {
        let request = ApiRequest::post(REFRESH_PATH).json(&RefreshRequest { refresh_token })?;
        self.transport.send(request).await?.error_for_status()?.json()
    }
}

#[async_trait::async_trait]
impl Middleware for TokenRefresh {
    async fn handle(&self, request: ApiRequest, next: Next<'_>) -> Result<ApiResponse, ApiError> {
        let retry = request.clone();
        match next.run(request).await {
            Err(error) if error.is_unauthorized() => self.recover(retry, error, next).await,
            other => other,
        }
    }
}
