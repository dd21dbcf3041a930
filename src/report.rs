//! The downloadable result of an optimization run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::optimizer::{BatchResult, BatchSummary, OptimizationConfig, TargetResult};

/// Recommendations for one uploaded batch, identified by its download id.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationReport {
    pub download_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub config: OptimizationConfig,
    pub summary: BatchSummary,
    pub results: Vec<TargetResult>,
}

impl OptimizationReport {
    pub fn new(config: OptimizationConfig, batch: BatchResult) -> Self {
        Self {
            download_id: Uuid::new_v4(),
            created_at: Utc::now(),
            config,
            summary: batch.summary,
            results: batch.results,
        }
    }

    /// Suggested file name for the download.
    pub fn file_name(&self) -> String {
        format!("bid-recommendations-{}.json", self.download_id)
    }

    /// Pretty-printed JSON document.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }
}
