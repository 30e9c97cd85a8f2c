//! Typed REST call groups.
//!
//! Each method emits exactly one HTTP call through [`ApiClient`] and returns
//! the raw response; decoding is left to the caller. Create/update bodies
//! for laboratories, samples and storage entities are free-form JSON objects
//! whose schema the server owns.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::borrow::Cow;

use serde_json::Value;

use super::client::ApiClient;
use super::transport::{ApiRequest, ApiResponse};
use super::types::{
    ChangePasswordRequest, ChangeStatusRequest, LoginRequest, LogoutRequest, MoveSampleRequest, PositionBlockRequest,
    RefreshRequest, SampleQuery,
};
use crate::error::ApiError;

/// Percent-encode a caller-supplied id or barcode for use as one path segment.
fn segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

// =============================================================================
// AUTH
// =============================================================================

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns the request client's error.
    pub async fn login(&self, username: &str, password: &str) -> Result<ApiResponse, ApiError> {
        let request = ApiRequest::post("/auth/login").json(&LoginRequest { username, password })?;
        self.client.send(request).await
    }

    /// `POST /auth/logout`, invalidating `refresh_token` server-side.
    ///
    /// # Errors
    ///
    /// Returns the request client's error.
    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<ApiResponse, ApiError> {
        let request = ApiRequest::post("/auth/logout").json(&LogoutRequest { refresh_token })?;
        self.client.send(request).await
    }

    /// `POST /auth/refresh` through the full chain.
    ///
    /// # Errors
    ///
    /// Returns the request client's error.
    pub async fn refresh(&self, refresh_token: &str) -> Result<ApiResponse, ApiError> {
        let request = ApiRequest::post("/auth/refresh").json(&RefreshRequest { refresh_token })?;
        self.client.send(request).await
    }

    /// `POST /auth/password/change`.
    ///
    /// # Errors
    ///
    /// Returns the request client's error.
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<ApiResponse, ApiError> {
        let request =
            ApiRequest::post("/auth/password/change").json(&ChangePasswordRequest { current_password, new_password })?;
        self.client.send(request).await
    }

    /// `POST /auth/me`.
    ///
    /// # Errors
    ///
    /// Returns the request client's error.
    pub async fn current_user(&self) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::post("/auth/me")).await
    }
}

// =============================================================================
// LABORATORIES
// =============================================================================

pub struct LaboratoryApi<'a> {
    client: &'a ApiClient,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> LaboratoryApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::get("/laboratories")).await
    }

    pub async fn current(&self) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::get("/laboratories/current")).await
    }

    pub async fn get(&self, id: &str) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::get(format!("/laboratories/{}", segment(id)))).await
    }

    pub async fn statistics(&self, id: &str) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::get(format!("/laboratories/{}/statistics", segment(id)))).await
    }

    pub async fn create(&self, data: &Value) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::post("/laboratories").json(data)?).await
    }

    pub async fn update(&self, id: &str, data: &Value) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::patch(format!("/laboratories/{}", segment(id))).json(data)?).await
    }
}

// =============================================================================
// SAMPLES
// =============================================================================

pub struct SampleApi<'a> {
    client: &'a ApiClient,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> SampleApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &SampleQuery) -> Result<ApiResponse, ApiError> {
        let mut request = ApiRequest::get("/samples");
        request.query = query.to_pairs();
        self.client.send(request).await
    }

    pub async fn get(&self, id: &str) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::get(format!("/samples/{}", segment(id)))).await
    }

    pub async fn by_barcode(&self, barcode: &str) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::get(format!("/samples/barcode/{}", segment(barcode)))).await
    }

    pub async fn history(&self, id: &str) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::get(format!("/samples/{}/history", segment(id)))).await
    }

    /// Samples expiring within `days`; the server picks the window when `None`.
    pub async fn expiring(&self, days: Option<u32>) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::get("/samples/expiring").query_opt("days", days)).await
    }

    pub async fn create(&self, data: &Value) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::post("/samples").json(data)?).await
    }

    pub async fn update(&self, id: &str, data: &Value) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::patch(format!("/samples/{}", segment(id))).json(data)?).await
    }

    pub async fn move_to(&self, id: &str, body: &MoveSampleRequest<'_>) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::post(format!("/samples/{}/move", segment(id))).json(body)?).await
    }

    pub async fn change_status(&self, id: &str, body: &ChangeStatusRequest<'_>) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::post(format!("/samples/{}/status", segment(id))).json(body)?).await
    }

    pub async fn delete(&self, id: &str) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::delete(format!("/samples/{}", segment(id)))).await
    }

    /// `GET /sample-types`, the choices offered by the sample form.
    pub async fn sample_types(&self) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::get("/sample-types")).await
    }
}

// =============================================================================
// STORAGE
// =============================================================================

/// Entities under `/storage` that share the list/get/create/update shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageKind {
    Room,
    Freezer,
    Box,
}

impl StorageKind {
    #[must_use]
    pub fn collection(self) -> &'static str {
        match self {
            Self::Room => "/storage/rooms",
            Self::Freezer => "/storage/freezers",
            Self::Box => "/storage/boxes",
        }
    }
}

pub struct StorageApi<'a> {
    client: &'a ApiClient,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> StorageApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn hierarchy(&self) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::get("/storage/hierarchy")).await
    }

    pub async fn occupancy(&self) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::get("/storage/occupancy")).await
    }

    pub async fn list(&self, kind: StorageKind) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::get(kind.collection())).await
    }

    pub async fn get(&self, kind: StorageKind, id: &str) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::get(format!("{}/{}", kind.collection(), segment(id)))).await
    }

    pub async fn create(&self, kind: StorageKind, data: &Value) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::post(kind.collection()).json(data)?).await
    }

    pub async fn update(&self, kind: StorageKind, id: &str, data: &Value) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::patch(format!("{}/{}", kind.collection(), segment(id))).json(data)?).await
    }

    /// Free positions, optionally within one box.
    pub async fn available_positions(&self, box_id: Option<&str>) -> Result<ApiResponse, ApiError> {
        self.client.send(ApiRequest::get("/storage/positions/available").query_opt("boxId", box_id)).await
    }

    pub async fn set_position_blocked(&self, id: &str, is_blocked: bool) -> Result<ApiResponse, ApiError> {
        let path = format!("/storage/positions/{}/block", segment(id));
        let request = ApiRequest::patch(path).json(&PositionBlockRequest { is_blocked })?;
        self.client.send(request).await
    }
}
