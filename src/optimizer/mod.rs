//! Bid optimization for sponsored-ads targets.
//!
//! Each target is evaluated independently:
//! - Zero-sale targets with a high CTR and low spend relative to AOV are
//!   classified as promising
//! - A new bid is derived from the target's ACOS against the target ACOS
//! - The batch is summarized once every target has a recommendation

mod batch;
mod bid;
mod classifier;
mod policy;
mod types;

pub use batch::{summarize, validate_batch};
pub use bid::BidRecommender;
pub use classifier::PromisingClassifier;
pub use policy::BidPolicy;
pub use types::{
    BatchResult, BatchSummary, BidAdjustment, OptimizationConfig, Target, TargetKind,
    TargetResult, TargetState,
};

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::error::ValidationError;

/// Classifier and recommender configured from one policy.
///
/// Holds no state between calls; identical input gives identical output.
#[derive(Debug, Clone)]
pub struct BidOptimizer {
    policy: BidPolicy,
    classifier: PromisingClassifier,
    recommender: BidRecommender,
}

impl BidOptimizer {
    /// Create an optimizer with the default policy.
    pub fn new() -> Self {
        Self::from_policy(BidPolicy::default())
    }

    /// Create an optimizer from a policy, rejecting out-of-range constants.
    pub fn with_policy(policy: BidPolicy) -> Result<Self, ValidationError> {
        policy.validate()?;
        Ok(Self::from_policy(policy))
    }

    fn from_policy(policy: BidPolicy) -> Self {
        Self {
            classifier: PromisingClassifier::new(&policy),
            recommender: BidRecommender::new(&policy),
            policy,
        }
    }

    /// Whether a zero-sale target merits a bid increase.
    pub fn classify(&self, target: &Target, config: &OptimizationConfig) -> bool {
        self.classifier.classify(target, config)
    }

    /// The next bid for a target.
    pub fn recommend_bid(
        &self,
        target: &Target,
        config: &OptimizationConfig,
        is_promising: bool,
    ) -> Result<Decimal, ValidationError> {
        self.recommender.recommend(target, config, is_promising)
    }

    /// Classify and re-bid every target in a batch.
    ///
    /// The batch is rejected as a whole if any record is invalid.
    pub fn optimize_batch(
        &self,
        targets: &[Target],
        config: &OptimizationConfig,
    ) -> Result<BatchResult, ValidationError> {
        self.optimize_batch_with_aov(targets, config, &HashMap::new())
    }

    /// Like [`optimize_batch`](Self::optimize_batch), with per-product
    /// average order values taking precedence over the config's AOV.
    pub fn optimize_batch_with_aov(
        &self,
        targets: &[Target],
        config: &OptimizationConfig,
        aov_by_product: &HashMap<String, Decimal>,
    ) -> Result<BatchResult, ValidationError> {
        validate_batch(targets)?;

        let results = targets
            .iter()
            .map(|target| {
                let aov = target
                    .product_id
                    .as_ref()
                    .and_then(|p| aov_by_product.get(p))
                    .copied()
                    .or(config.average_order_value());
                let is_promising = self.classifier.classify_with_aov(target, config, aov);
                let recommended_bid = self.recommender.recommend(target, config, is_promising)?;
                Ok(TargetResult {
                    target: target.clone(),
                    is_promising,
                    recommended_bid,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        let summary = summarize(&results)?;

        tracing::debug!(
            total = summary.total_count,
            updates = summary.updates_recommended_count,
            promising = summary.promising_count,
            average_change = %summary.average_bid_change,
            "Optimized batch"
        );

        Ok(BatchResult { results, summary })
    }

    /// The policy this optimizer was built from.
    pub fn policy(&self) -> &BidPolicy {
        &self.policy
    }
}

impl Default for BidOptimizer {
    fn default() -> Self {
        Self::new()
    }
}
