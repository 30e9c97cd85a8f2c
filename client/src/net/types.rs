//! Wire DTOs for the laboratory API.
//!
//! DESIGN
//! ======
//! Field names follow the server's camelCase JSON. Request bodies borrow
//! their strings; response types own theirs. Optional request fields are
//! omitted rather than sent as `null`.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// AUTH
// =============================================================================

/// The authenticated user as returned by `/auth/login` and `/auth/me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    /// `None` for global admins not scoped to a laboratory.
    #[serde(default)]
    pub laboratory_id: Option<String>,
    #[serde(default)]
    pub is_global_admin: bool,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Access/refresh token pair. Also the body of a `/auth/refresh` answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub tokens: AuthTokens,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

// =============================================================================
// SAMPLES
// =============================================================================

/// Lifecycle status of a sample. Transitions are enforced by the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SampleStatus {
    Collected,
    Stored,
    InTransfer,
    UnderAnalysis,
    Archived,
    Discarded,
}

impl SampleStatus {
    pub const ALL: [Self; 6] = [
        Self::Collected,
        Self::Stored,
        Self::InTransfer,
        Self::UnderAnalysis,
        Self::Archived,
        Self::Discarded,
    ];

    /// Wire name, e.g. `IN_TRANSFER`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collected => "COLLECTED",
            Self::Stored => "STORED",
            Self::InTransfer => "IN_TRANSFER",
            Self::UnderAnalysis => "UNDER_ANALYSIS",
            Self::Archived => "ARCHIVED",
            Self::Discarded => "DISCARDED",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Collected => "Collected",
            Self::Stored => "Stored",
            Self::InTransfer => "In transfer",
            Self::UnderAnalysis => "Under analysis",
            Self::Archived => "Archived",
            Self::Discarded => "Discarded",
        }
    }

    /// Parse a wire name, case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

impl fmt::Display for SampleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Filters for `GET /samples`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub status: Option<SampleStatus>,
}

impl Default for SampleQuery {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_PAGE_SIZE, search: None, status: None }
    }
}

impl SampleQuery {
    /// Query-string pairs, leaving out blank filters.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("page".to_owned(), self.page.to_string()), ("limit".to_owned(), self.limit.to_string())];
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search".to_owned(), search.to_owned()));
        }
        if let Some(status) = self.status {
            pairs.push(("status".to_owned(), status.as_str().to_owned()));
        }
        pairs
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSampleRequest<'a> {
    pub to_position_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct ChangeStatusRequest<'a> {
    pub status: SampleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<&'a str>,
}

// =============================================================================
// STORAGE
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionBlockRequest {
    pub is_blocked: bool,
}

/// Position counts from `GET /storage/occupancy`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageOccupancy {
    pub total: u64,
    pub occupied: u64,
    pub available: u64,
}

// =============================================================================
// LABORATORIES
// =============================================================================

/// Aggregates from `GET /laboratories/:id/statistics`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LaboratoryStatistics {
    pub total_samples: u64,
    /// Sample counts keyed by status wire name.
    pub samples_by_status: BTreeMap<String, u64>,
    pub pending_transfers: u64,
}
