//! Dashboard summary for the authenticated landing route.
//!
//! SYSTEM CONTEXT
//! ==============
//! Three independent reads run concurrently: laboratory statistics (only
//! when the user belongs to a laboratory), samples expiring within
//! [`EXPIRING_WINDOW_DAYS`], and storage occupancy. A failed read is logged
//! and its figures show as zero; the summary itself never fails.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::net::client::ApiClient;
use crate::net::types::{LaboratoryStatistics, SampleStatus, StorageOccupancy};
use crate::state::session::SessionStore;

pub const EXPIRING_WINDOW_DAYS: u32 = 30;

/// One status bucket of the samples-by-status breakdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSlice {
    pub status: String,
    /// Display label; unknown statuses show their wire name.
    pub label: String,
    pub count: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_samples: u64,
    pub occupied_positions: u64,
    pub expiring_samples: u64,
    pub pending_transfers: u64,
    pub by_status: Vec<StatusSlice>,
}

impl DashboardSummary {
    /// Load every figure for the signed-in user.
    pub async fn load(session: &SessionStore, api: &ApiClient) -> Self {
        let laboratory_id = session.user().and_then(|user| user.laboratory_id);

        let statistics = async {
            match &laboratory_id {
                Some(id) => api.laboratories().statistics(id).await?.json::<LaboratoryStatistics>().map(Some),
                None => Ok(None),
            }
        };
        let expiring = async { api.samples().expiring(Some(EXPIRING_WINDOW_DAYS)).await?.json::<Vec<Value>>() };
        let occupancy = async { api.storage().occupancy().await?.json::<StorageOccupancy>() };

        let (statistics, expiring, occupancy) = tokio::join!(statistics, expiring, occupancy);

        let statistics = or_default("laboratory statistics", statistics).unwrap_or_default();
        let expiring = or_default("expiring samples", expiring);
        let occupancy = or_default("storage occupancy", occupancy);

        Self {
            total_samples: statistics.total_samples,
            occupied_positions: occupancy.occupied,
            expiring_samples: expiring.len() as u64,
            pending_transfers: statistics.pending_transfers,
            by_status: status_slices(&statistics),
        }
    }
}

fn or_default<T: Default>(what: &str, result: Result<T, ApiError>) -> T {
    result.unwrap_or_else(|error| {
        tracing::warn!(%error, code = error.error_code(), "dashboard: failed to load {what}");
        T::default()
    })
}

fn status_slices(statistics: &LaboratoryStatistics) -> Vec<StatusSlice> {
    statistics
        .samples_by_status
        .iter()
        .map(|(status, count)| StatusSlice {
            status: status.clone(),
            label: SampleStatus::parse(status).map_or_else(|| status.clone(), |known| known.label().to_owned()),
            count: *count,
        })
        .collect()
}
