//! Bid policy constants.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::error::ValidationError;

/// Thresholds and step sizes that shape every recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BidPolicy {
    /// Lowest bid ever recommended.
    pub min_bid: Decimal,
    /// Largest relative increase in a single run.
    pub max_increase: Decimal,
    /// Relative increase applied to promising zero-sale targets.
    pub promising_increase: Decimal,
    /// CTR a zero-sale target needs to count as promising.
    pub min_promising_ctr: Decimal,
    /// Largest spend / AOV ratio a promising target may have.
    pub max_promising_spend_ratio: Decimal,
}

impl Default for BidPolicy {
    fn default() -> Self {
        Self {
            min_bid: dec!(0.02),
            max_increase: dec!(0.20),              // +20% per run
            promising_increase: dec!(0.05),        // +5%
            min_promising_ctr: dec!(0.003),        // 0.3%
            max_promising_spend_ratio: dec!(0.10), // 10% of AOV
        }
    }
}

impl BidPolicy {
    /// Check that every constant is in range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_bid <= Decimal::ZERO {
            return Err(invalid(format!(
                "min_bid must be greater than zero (got {})",
                self.min_bid
            )));
        }
        // Bids are rounded to cents, so the floor has to be representable.
        if self.min_bid.normalize().scale() > 2 {
            return Err(invalid(format!(
                "min_bid must have at most 2 decimal places (got {})",
                self.min_bid
            )));
        }
        for (name, value) in [
            ("max_increase", self.max_increase),
            ("promising_increase", self.promising_increase),
            ("min_promising_ctr", self.min_promising_ctr),
            ("max_promising_spend_ratio", self.max_promising_spend_ratio),
        ] {
            if value < Decimal::ZERO {
                return Err(invalid(format!(
                    "{} must not be negative (got {})",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

fn invalid(reason: String) -> ValidationError {
    ValidationError::InvalidPolicy { reason }
}
