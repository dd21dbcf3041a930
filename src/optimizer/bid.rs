//! ACOS-driven bid recommendation.

use rust_decimal::{Decimal, RoundingStrategy};

use super::policy::BidPolicy;
use super::types::{OptimizationConfig, Target};
use crate::error::ValidationError;

/// Currency minor-unit precision for bids.
const BID_DECIMAL_PLACES: u32 = 2;

/// Computes the next bid for a target from its ACOS and the target ACOS.
#[derive(Debug, Clone)]
pub struct BidRecommender {
    min_bid: Decimal,
    max_increase: Decimal,
    promising_increase: Decimal,
}

impl BidRecommender {
    /// Create a recommender from the policy step sizes.
    pub fn new(policy: &BidPolicy) -> Self {
        Self {
            min_bid: policy.min_bid,
            max_increase: policy.max_increase,
            promising_increase: policy.promising_increase,
        }
    }

    /// Recommend a bid.
    ///
    /// - ACOS above target: scale down by `target_acos / acos`.
    /// - ACOS at or below target: scale up by the same ratio, capped at
    ///   `1 + max_increase`. Zero ACOS takes the cap directly.
    /// - No sales: promising targets get `1 + promising_increase`, the rest
    ///   keep their bid.
    ///
    /// The result is rounded to cents and never below `min_bid`. Fails when
    /// the ACOS or the new bid does not fit in a `Decimal`.
    pub fn recommend(
        &self,
        target: &Target,
        config: &OptimizationConfig,
        is_promising: bool,
    ) -> Result<Decimal, ValidationError> {
        let current = target.current_bid;
        let target_acos = config.target_acos();

        let out_of_range = |field| ValidationError::ValueOutOfRange {
            target_id: target.id.clone(),
            field,
        };

        let raw = match target.acos() {
            Some(acos) if acos > target_acos => scale(current, target_acos.checked_div(acos)),
            Some(acos) if acos.is_zero() => raise(current, self.max_increase),
            Some(acos) => {
                let capped = raise(current, self.max_increase);
                let scaled = scale(current, target_acos.checked_div(acos));
                match (capped, scaled) {
                    (Some(capped), Some(scaled)) => Some(capped.min(scaled)),
                    // Whichever side overflowed is above the other.
                    (Some(capped), None) => Some(capped),
                    (None, Some(scaled)) => Some(scaled),
                    (None, None) => None,
                }
            }
            None if target.sales > Decimal::ZERO => return Err(out_of_range("acos")),
            None if is_promising => raise(current, self.promising_increase),
            None => Some(current),
        };

        raw.map(|bid| self.finalize(bid))
            .ok_or_else(|| out_of_range("recommended_bid"))
    }

    fn finalize(&self, bid: Decimal) -> Decimal {
        bid.round_dp_with_strategy(BID_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
            .max(self.min_bid)
    }
}

/// `bid * (1 + step)`, or `None` on overflow.
fn raise(bid: Decimal, step: Decimal) -> Option<Decimal> {
    Decimal::ONE
        .checked_add(step)
        .and_then(|factor| bid.checked_mul(factor))
}

/// `bid * ratio`, or `None` if the ratio or the product overflowed.
fn scale(bid: Decimal, ratio: Option<Decimal>) -> Option<Decimal> {
    ratio.and_then(|ratio| bid.checked_mul(ratio))
}

impl Default for BidRecommender {
    fn default() -> Self {
        Self::new(&BidPolicy::default())
    }
}
