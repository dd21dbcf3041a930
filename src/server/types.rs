//! Request and response DTOs for the HTTP API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ads::TargetQuery;
use crate::optimizer::{BatchSummary, OptimizationConfig};

// --- Upload / download ---

/// Query parameters of `POST /optimize`.
#[derive(Debug, Deserialize)]
pub struct OptimizeParams {
    /// Target ACOS as a percentage, e.g. `30`.
    pub target_acos: Decimal,
    #[serde(default)]
    pub increase_spend: bool,
    #[serde(default, alias = "average_order_value")]
    pub aov: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OptimizeResponse {
    pub message: String,
    pub download_id: Uuid,
    pub summary: BatchSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

// --- Ads ---

/// Body of `POST /ads/optimize`.
#[derive(Debug, Deserialize)]
pub struct AdsOptimizeRequest {
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub ad_group_id: Option<String>,
    /// Target ACOS as a percentage.
    pub target_acos: Decimal,
    #[serde(default)]
    pub increase_spend: bool,
    #[serde(default)]
    pub average_order_value: Option<Decimal>,
}

impl AdsOptimizeRequest {
    pub fn query(&self) -> TargetQuery {
        TargetQuery {
            campaign_id: self.campaign_id.clone(),
            ad_group_id: self.ad_group_id.clone(),
        }
    }
}

/// Build a validated config from the percentage-based wire parameters.
pub fn config_from_params(
    target_acos_percent: Decimal,
    increase_spend: bool,
    average_order_value: Option<Decimal>,
) -> Result<OptimizationConfig, crate::error::ValidationError> {
    OptimizationConfig::from_percent(target_acos_percent, increase_spend)?
        .with_optional_average_order_value(average_order_value)
}
