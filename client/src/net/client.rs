//! The shared authenticated request client.

use std::sync::Arc;

use super::api::{AuthApi, LaboratoryApi, SampleApi, StorageApi};
use super::auth_layer::{BearerAuth, LoginRedirect, TokenRefresh};
use super::middleware::{Pipeline, TraceLayer};
use super::tokens::TokenStore;
use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::error::ApiError;

/// Cheaply clonable handle over one middleware pipeline.
#[derive(Clone)]
pub struct ApiClient {
    pipeline: Arc<Pipeline>,
}

impl ApiClient {
    #[must_use]
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline: Arc::new(pipeline) }
    }

    /// Standard chain: tracing, bearer injection, refresh-and-retry.
    #[must_use]
    pub fn authenticated(transport: Arc<dyn Transport>, tokens: TokenStore, redirect: Arc<dyn LoginRedirect>) -> Self {
        let pipeline = Pipeline::new(transport.clone())
            .layer(TraceLayer)
            .layer(BearerAuth::new(tokens.clone()))
            .layer(TokenRefresh::new(tokens, transport, redirect));
        Self::new(pipeline)
    }

    /// Send a request through the chain.
    ///
    /// # Errors
    ///
    /// Returns the chain's error, including non-2xx answers.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.pipeline.send(request).await
    }

    #[must_use]
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    #[must_use]
    pub fn laboratories(&self) -> LaboratoryApi<'_> {
        LaboratoryApi::new(self)
    }

    #[must_use]
    pub fn samples(&self) -> SampleApi<'_> {
        SampleApi::new(self)
    }

    #[must_use]
    pub fn storage(&self) -> StorageApi<'_> {
        StorageApi::new(self)
    }
}
