//! Explicit middleware chain around the [`Transport`] send primitive.
//!
//! DESIGN
//! ======
//! Each layer receives the request plus a [`Next`] cursor over the layers
//! after it. A layer may rewrite the request before calling `next.run`, and
//! may inspect or replace the result afterwards. Calling `next.run` a second
//! time re-enters only the inner layers, never the caller itself, which is
//! what keeps a retry from re-triggering the policy that issued it.

#[cfg(test)]
#[path = "middleware_test.rs"]
mod middleware_test;

use std::sync::Arc;
use std::time::Instant;

use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::error::ApiError;

/// One stage of the request pipeline.
#[async_trait::async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, request: ApiRequest, next: Next<'_>) -> Result<ApiResponse, ApiError>;
}

/// Cursor over the remaining layers and the terminal transport.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    transport: &'a dyn Transport,
    layers: &'a [Arc<dyn Middleware>],
}

impl<'a> Next<'a> {
    fn new(transport: &'a dyn Transport, layers: &'a [Arc<dyn Middleware>]) -> Self {
        Self { transport, layers }
    }

    /// Pass `request` to the next layer, or to the transport when none remain.
    ///
    /// # Errors
    ///
    /// Returns the first error produced downstream; non-2xx answers surface
    /// as [`ApiError::Status`].
    pub async fn run(self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        match self.layers.split_first() {
            Some((layer, rest)) => layer.handle(request, Next::new(self.transport, rest)).await,
            None => self.transport.send(request).await?.error_for_status(),
        }
    }
}

/// A transport wrapped by an ordered list of layers, outermost first.
pub struct Pipeline {
    transport: Arc<dyn Transport>,
    layers: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport, layers: Vec::new() }
    }

    /// Append a layer inside the ones already added.
    #[must_use]
    pub fn layer(mut self, layer: impl Middleware + 'static) -> Self {
        self.layers.push(Arc::new(layer));
        self
    }

    /// Run `request` through every layer and the transport.
    ///
    /// # Errors
    ///
    /// Returns the error produced by the chain.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        Next::new(self.transport.as_ref(), &self.layers).run(request).await
    }
}

// =============================================================================
// TRACING
// =============================================================================

/// Logs method, path, status and latency of every call at `debug`.
pub struct TraceLayer;

#[async_trait::async_trait]
impl Middleware for TraceLayer {
    async fn handle(&self, request: ApiRequest, next: Next<'_>) -> Result<ApiResponse, ApiError> {
        let method = request.method.clone();
        let path = request.path.clone();
        let started = Instant::now();

        let result = next.run(request).await;

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &result {
            Ok(response) => {
                tracing::debug!(%method, %path, status = response.status, elapsed_ms, "api call");
            }
            Err(error) => {
                tracing::debug!(%method, %path, status = ?error.status(), elapsed_ms, %error, "api call failed");
            }
        }
        result
    }
}
