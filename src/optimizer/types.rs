//! Data model for bid optimization.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Match type of a keyword, or the kind of a targeting expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetKind {
    #[serde(alias = "broad")]
    Broad,
    #[serde(alias = "phrase")]
    Phrase,
    #[serde(alias = "exact")]
    Exact,
    #[serde(alias = "asin")]
    Asin,
    #[serde(alias = "category")]
    Category,
    #[default]
    #[serde(alias = "other")]
    Other,
}

/// Serving state of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetState {
    #[default]
    #[serde(alias = "enabled")]
    Enabled,
    #[serde(alias = "paused")]
    Paused,
    #[serde(alias = "archived")]
    Archived,
}

impl std::fmt::Display for TargetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetState::Enabled => write!(f, "ENABLED"),
            TargetState::Paused => write!(f, "PAUSED"),
            TargetState::Archived => write!(f, "ARCHIVED"),
        }
    }
}

/// One keyword or targeting expression with its performance metrics.
///
/// Aliases accept the field names used by the advertising API exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(alias = "keywordId", alias = "expressionId", alias = "targetId")]
    pub id: String,
    #[serde(alias = "campaignId")]
    pub campaign_id: String,
    #[serde(alias = "adGroupId")]
    pub ad_group_id: String,
    #[serde(default, alias = "matchType", alias = "expressionType")]
    pub kind: TargetKind,
    /// Keyword text or targeting expression.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "keywordText",
        alias = "expression"
    )]
    pub label: Option<String>,
    #[serde(default)]
    pub state: TargetState,
    #[serde(alias = "bid")]
    pub current_bid: Decimal,
    pub impressions: u64,
    pub clicks: u64,
    pub cost: Decimal,
    pub sales: Decimal,
    /// Advertised product, used to look up a per-product average order value.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "productId")]
    pub product_id: Option<String>,
}

impl Target {
    /// Advertising cost of sale. `None` when nothing was sold, or when
    /// `cost / sales` does not fit in a `Decimal`.
    pub fn acos(&self) -> Option<Decimal> {
        if self.sales > Decimal::ZERO {
            self.cost.checked_div(self.sales)
        } else {
            None
        }
    }

    /// Click-through rate. `None` without impressions.
    pub fn ctr(&self) -> Option<Decimal> {
        if self.impressions == 0 {
            None
        } else {
            Decimal::from(self.clicks).checked_div(Decimal::from(self.impressions))
        }
    }
}

/// Parameters for one optimization run.
///
/// Fields are private so a constructed value always satisfies its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptimizationConfig {
    target_acos: Decimal,
    increase_spend_on_promising: bool,
    average_order_value: Option<Decimal>,
}

impl OptimizationConfig {
    /// Create a config. `target_acos` is a fraction, e.g. 0.30 for 30%.
    pub fn new(
        target_acos: Decimal,
        increase_spend_on_promising: bool,
    ) -> Result<Self, ValidationError> {
        if target_acos <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveTargetAcos(target_acos));
        }
        Ok(Self {
            target_acos,
            increase_spend_on_promising,
            average_order_value: None,
        })
    }

    /// Create a config from a whole-number percentage such as `30`.
    pub fn from_percent(
        target_acos_percent: Decimal,
        increase_spend_on_promising: bool,
    ) -> Result<Self, ValidationError> {
        if target_acos_percent <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveTargetAcos(target_acos_percent));
        }
        Self::new(
            target_acos_percent / Decimal::ONE_HUNDRED,
            increase_spend_on_promising,
        )
    }

    /// Set the average order value used for promising-target detection.
    pub fn with_average_order_value(mut self, aov: Decimal) -> Result<Self, ValidationError> {
        if aov <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAverageOrderValue(aov));
        }
        self.average_order_value = Some(aov);
        Ok(self)
    }

    /// Like [`with_average_order_value`](Self::with_average_order_value), but a
    /// missing value leaves the config unchanged.
    pub fn with_optional_average_order_value(
        self,
        aov: Option<Decimal>,
    ) -> Result<Self, ValidationError> {
        match aov {
            Some(aov) => self.with_average_order_value(aov),
            None => Ok(self),
        }
    }

    pub fn target_acos(&self) -> Decimal {
        self.target_acos
    }

    pub fn increase_spend_on_promising(&self) -> bool {
        self.increase_spend_on_promising
    }

    pub fn average_order_value(&self) -> Option<Decimal> {
        self.average_order_value
    }
}

/// Outcome for a single target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetResult {
    pub target: Target,
    pub is_promising: bool,
    pub recommended_bid: Decimal,
}

impl TargetResult {
    /// Signed difference between the recommended and the current bid.
    pub fn bid_change(&self) -> Decimal {
        self.recommended_bid - self.target.current_bid
    }

    /// Whether applying the recommendation would change the bid.
    pub fn is_update(&self) -> bool {
        self.recommended_bid != self.target.current_bid
    }
}

/// Aggregate figures for a batch. All zero for an empty batch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_count: usize,
    pub updates_recommended_count: usize,
    /// Mean of `recommended_bid - current_bid`, rounded to 4 places.
    pub average_bid_change: Decimal,
    pub promising_count: usize,
    pub increased_count: usize,
    pub decreased_count: usize,
}

/// A bid change to push to the advertising API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidAdjustment {
    #[serde(alias = "targetId")]
    pub target_id: String,
    pub bid: Decimal,
}

/// Annotated batch plus its summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub results: Vec<TargetResult>,
    pub summary: BatchSummary,
}

impl BatchResult {
    /// The recommendations that differ from the current bid.
    pub fn adjustments(&self) -> Vec<BidAdjustment> {
        self.results
            .iter()
            .filter(|r| r.is_update())
            .map(|r| BidAdjustment {
                target_id: r.target.id.clone(),
                bid: r.recommended_bid,
            })
            .collect()
    }
}
