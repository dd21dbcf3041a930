//! Batch validation and summary.

use std::collections::HashSet;

use rust_decimal::{Decimal, RoundingStrategy};

use super::types::{BatchSummary, Target, TargetResult};
use crate::error::ValidationError;

/// Check every record before any of them is evaluated.
///
/// The first violation rejects the batch.
pub fn validate_batch(targets: &[Target]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(targets.len());

    for target in targets {
        if target.clicks > target.impressions {
            return Err(ValidationError::ClicksExceedImpressions {
                target_id: target.id.clone(),
                clicks: target.clicks,
                impressions: target.impressions,
            });
        }

        for (field, value) in [
            ("current_bid", target.current_bid),
            ("cost", target.cost),
            ("sales", target.sales),
        ] {
            if value < Decimal::ZERO {
                return Err(ValidationError::NegativeAmount {
                    target_id: target.id.clone(),
                    field,
                    value,
                });
            }
        }

        if target.sales > Decimal::ZERO && target.acos().is_none() {
            return Err(ValidationError::ValueOutOfRange {
                target_id: target.id.clone(),
                field: "acos",
            });
        }

        if !seen.insert(target.id.as_str()) {
            return Err(ValidationError::DuplicateTarget {
                target_id: target.id.clone(),
            });
        }
    }

    Ok(())
}

/// Aggregate per-target results.
///
/// Fails if the total bid change does not fit in a `Decimal`.
pub fn summarize(results: &[TargetResult]) -> Result<BatchSummary, ValidationError> {
    if results.is_empty() {
        return Ok(BatchSummary::default());
    }

    let mut summary = BatchSummary {
        total_count: results.len(),
        ..BatchSummary::default()
    };
    let mut total_change = Decimal::ZERO;

    for result in results {
        let change = result.bid_change();
        total_change =
            total_change
                .checked_add(change)
                .ok_or_else(|| ValidationError::ValueOutOfRange {
                    target_id: result.target.id.clone(),
                    field: "bid_change",
                })?;

        if result.is_update() {
            summary.updates_recommended_count += 1;
        }
        if result.is_promising {
            summary.promising_count += 1;
        }
        if change > Decimal::ZERO {
            summary.increased_count += 1;
        } else if change < Decimal::ZERO {
            summary.decreased_count += 1;
        }
    }

    summary.average_bid_change = (total_change / Decimal::from(results.len()))
        .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
    Ok(summary)
}
