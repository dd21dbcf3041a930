//! Fetch, optimize, push: one bid management cycle against the ads API.

use serde::Serialize;

use super::{AdsApi, BidUpdateResult, TargetQuery, UpdateBidsRequest};
use crate::error::AdsError;
use crate::optimizer::{BatchResult, BidOptimizer, OptimizationConfig};

/// What a cycle recommended and what the API accepted.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub batch: BatchResult,
    pub updates: Vec<BidUpdateResult>,
}

impl SyncReport {
    pub fn applied_count(&self) -> usize {
        self.updates.iter().filter(|u| u.success).count()
    }

    pub fn failed_count(&self) -> usize {
        self.updates.len() - self.applied_count()
    }
}

/// Run one cycle. Only bids that change are sent.
pub async fn run_cycle(
    api: &dyn AdsApi,
    optimizer: &BidOptimizer,
    query: &TargetQuery,
    config: &OptimizationConfig,
) -> Result<SyncReport, AdsError> {
    let targets = api.get_optimizable_targets(query).await?;
    let batch = optimizer.optimize_batch(&targets, config)?;

    let request = UpdateBidsRequest {
        adjustments: batch.adjustments(),
    };
    let updates = if request.adjustments.is_empty() {
        Vec::new()
    } else {
        api.update_target_bids(&request).await?
    };

    let report = SyncReport { batch, updates };

    if report.failed_count() > 0 {
        tracing::warn!(
            applied = report.applied_count(),
            failed = report.failed_count(),
            "Some bid updates were rejected"
        );
    } else {
        tracing::info!(
            targets = report.batch.summary.total_count,
            applied = report.applied_count(),
            "Bid cycle complete"
        );
    }

    Ok(report)
}
