//! Promising-target detection.

use rust_decimal::Decimal;

use super::policy::BidPolicy;
use super::types::{OptimizationConfig, Target};

/// Flags zero-sale targets that show enough interest to deserve more spend.
///
/// A target is promising when it has no sales, a CTR of at least
/// `min_ctr`, and has spent at most `max_spend_ratio` of the average
/// order value.
#[derive(Debug, Clone)]
pub struct PromisingClassifier {
    min_ctr: Decimal,
    max_spend_ratio: Decimal,
}

impl PromisingClassifier {
    /// Create a classifier from the policy thresholds.
    pub fn new(policy: &BidPolicy) -> Self {
        Self {
            min_ctr: policy.min_promising_ctr,
            max_spend_ratio: policy.max_promising_spend_ratio,
        }
    }

    /// Classify using the config's average order value.
    pub fn classify(&self, target: &Target, config: &OptimizationConfig) -> bool {
        self.classify_with_aov(target, config, config.average_order_value())
    }

    /// Classify against an explicit average order value.
    ///
    /// Without an AOV nothing is promising.
    pub fn classify_with_aov(
        &self,
        target: &Target,
        config: &OptimizationConfig,
        average_order_value: Option<Decimal>,
    ) -> bool {
        if !config.increase_spend_on_promising() {
            return false;
        }
        let Some(aov) = average_order_value.filter(|v| *v > Decimal::ZERO) else {
            return false;
        };
        if target.sales > Decimal::ZERO {
            return false;
        }
        let Some(ctr) = target.ctr() else {
            return false;
        };

        // A spend ratio too large to represent is over any threshold.
        let within_spend = target
            .cost
            .checked_div(aov)
            .is_some_and(|ratio| ratio <= self.max_spend_ratio);
        ctr >= self.min_ctr && within_spend && target.sales.is_zero()
    }
}

impl Default for PromisingClassifier {
    fn default() -> Self {
        Self::new(&BidPolicy::default())
    }
}
