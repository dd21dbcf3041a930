//! Advertising API abstraction.
//!
//! The optimizer only needs two calls from the ads platform: list the
//! targets that can be re-bid, and push new bids back. Each bid update
//! reports its own outcome; the batch call succeeds even if some fail.

mod memory;
pub mod sync;

pub use memory::{InMemoryAdsApi, demo_catalog};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AdsError;
use crate::optimizer::{BidAdjustment, Target};

/// Filter for [`AdsApi::get_optimizable_targets`]. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetQuery {
    #[serde(default, alias = "campaignId")]
    pub campaign_id: Option<String>,
    #[serde(default, alias = "adGroupId")]
    pub ad_group_id: Option<String>,
}

impl TargetQuery {
    pub fn matches(&self, target: &Target) -> bool {
        self.campaign_id
            .as_ref()
            .is_none_or(|c| *c == target.campaign_id)
            && self
                .ad_group_id
                .as_ref()
                .is_none_or(|a| *a == target.ad_group_id)
    }
}

/// A batch of bid changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBidsRequest {
    pub adjustments: Vec<BidAdjustment>,
}

/// Outcome of one bid change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidUpdateResult {
    pub target_id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BidUpdateResult {
    pub fn applied(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            success: true,
            message: None,
        }
    }

    pub fn rejected(target_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Response envelope used by the ads endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now(),
        }
    }
}

/// Sponsored-ads bid management calls.
#[async_trait]
pub trait AdsApi: Send + Sync {
    /// List targets matching the query.
    async fn get_optimizable_targets(
        &self,
        query: &TargetQuery,
    ) -> Result<Vec<Target>, AdsError>;

    /// Apply bid changes, one result per adjustment in request order.
    async fn update_target_bids(
        &self,
        request: &UpdateBidsRequest,
    ) -> Result<Vec<BidUpdateResult>, AdsError>;
}
