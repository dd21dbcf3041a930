//! In-memory store of generated reports, keyed by download id.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::report::OptimizationReport;

#[derive(Default)]
struct Inner {
    reports: HashMap<Uuid, Arc<OptimizationReport>>,
    /// Insertion order, oldest first.
    order: VecDeque<Uuid>,
}

/// Bounded report store. The oldest report is evicted once full.
#[derive(Clone)]
pub struct ReportStore {
    inner: Arc<RwLock<Inner>>,
    capacity: usize,
}

impl ReportStore {
    /// `capacity` is clamped to at least one report.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            capacity: capacity.max(1),
        }
    }

    /// Store a report and return its download id.
    pub async fn insert(&self, report: OptimizationReport) -> Uuid {
        let id = report.download_id;
        let mut inner = self.inner.write().await;

        while inner.order.len() >= self.capacity {
            if let Some(evicted) = inner.order.pop_front() {
                inner.reports.remove(&evicted);
                tracing::debug!(download_id = %evicted, "Evicted report");
            }
        }

        inner.order.push_back(id);
        inner.reports.insert(id, Arc::new(report));
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<OptimizationReport>> {
        self.inner.read().await.reports.get(&id).cloned()
    }

    /// Number of reports currently held.
    pub async fn count(&self) -> usize {
        self.inner.read().await.reports.len()
    }
}
