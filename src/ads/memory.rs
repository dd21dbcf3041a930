//! In-memory ads API for local runs and tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::RwLock;

use super::{AdsApi, BidUpdateResult, TargetQuery, UpdateBidsRequest};
use crate::error::AdsError;
use crate::optimizer::{Target, TargetKind, TargetState};

/// Holds targets in memory and applies bid updates to them.
///
/// Updates are rejected for unknown ids, archived targets, and
/// non-positive bids. Nothing fails at random.
pub struct InMemoryAdsApi {
    targets: RwLock<Vec<Target>>,
}

impl InMemoryAdsApi {
    pub fn new(targets: Vec<Target>) -> Self {
        Self {
            targets: RwLock::new(targets),
        }
    }

    /// An API seeded with [`demo_catalog`].
    pub fn with_demo_catalog() -> Self {
        Self::new(demo_catalog())
    }

    /// Snapshot of all stored targets.
    pub async fn targets(&self) -> Vec<Target> {
        self.targets.read().await.clone()
    }
}

impl Default for InMemoryAdsApi {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl AdsApi for InMemoryAdsApi {
    async fn get_optimizable_targets(
        &self,
        query: &TargetQuery,
    ) -> Result<Vec<Target>, AdsError> {
        let targets = self.targets.read().await;
        Ok(targets.iter().filter(|t| query.matches(t)).cloned().collect())
    }

    async fn update_target_bids(
        &self,
        request: &UpdateBidsRequest,
    ) -> Result<Vec<BidUpdateResult>, AdsError> {
        let mut targets = self.targets.write().await;

        let results = request
            .adjustments
            .iter()
            .map(|adj| {
                let Some(target) = targets.iter_mut().find(|t| t.id == adj.target_id) else {
                    return BidUpdateResult::rejected(&adj.target_id, "target not found");
                };
                if target.state == TargetState::Archived {
                    return BidUpdateResult::rejected(&adj.target_id, "target is archived");
                }
                if adj.bid <= Decimal::ZERO {
                    return BidUpdateResult::rejected(
                        &adj.target_id,
                        "bid must be greater than zero",
                    );
                }

                tracing::debug!(
                    target_id = %adj.target_id,
                    state = %target.state,
                    old_bid = %target.current_bid,
                    new_bid = %adj.bid,
                    "Updated bid"
                );
                target.current_bid = adj.bid;
                BidUpdateResult::applied(&adj.target_id)
            })
            .collect();

        Ok(results)
    }
}

/// Sample keywords and targeting expressions.
pub fn demo_catalog() -> Vec<Target> {
    #[allow(clippy::too_many_arguments)]
    fn target(
        id: &str,
        campaign_id: &str,
        ad_group_id: &str,
        kind: TargetKind,
        label: &str,
        state: TargetState,
        current_bid: Decimal,
        impressions: u64,
        clicks: u64,
        cost: Decimal,
        sales: Decimal,
    ) -> Target {
        Target {
            id: id.to_string(),
            campaign_id: campaign_id.to_string(),
            ad_group_id: ad_group_id.to_string(),
            kind,
            label: Some(label.to_string()),
            state,
            current_bid,
            impressions,
            clicks,
            cost,
            sales,
            product_id: None,
        }
    }

    vec![
        target(
            "kw-001",
            "camp-abc",
            "ag-123",
            TargetKind::Broad,
            "running shoes",
            TargetState::Enabled,
            dec!(0.75),
            1500,
            50,
            dec!(37.5),
            dec!(250),
        ),
        target(
            "kw-002",
            "camp-abc",
            "ag-123",
            TargetKind::Phrase,
            "best running shoes",
            TargetState::Enabled,
            dec!(1.20),
            800,
            60,
            dec!(72.0),
            dec!(600),
        ),
        target(
            "kw-003",
            "camp-abc",
            "ag-456",
            TargetKind::Exact,
            "nike air zoom",
            TargetState::Paused,
            dec!(2.50),
            50,
            5,
            dec!(12.5),
            Decimal::ZERO,
        ),
        target(
            "tgt-001",
            "camp-xyz",
            "ag-789",
            TargetKind::Asin,
            "asin=\"B0EXAMPLE1\"",
            TargetState::Enabled,
            dec!(0.90),
            2000,
            80,
            dec!(72.0),
            dec!(400),
        ),
        target(
            "tgt-002",
            "camp-xyz",
            "ag-789",
            TargetKind::Category,
            "category=\"Shoes & Bags\"",
            TargetState::Enabled,
            dec!(0.50),
            5000,
            100,
            dec!(50.0),
            dec!(300),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::BidAdjustment;

    fn adjustment(target_id: &str, bid: Decimal) -> BidAdjustment {
        BidAdjustment {
            target_id: target_id.to_string(),
            bid,
        }
    }

    #[tokio::test]
    async fn test_filters_by_campaign() {
        let api = InMemoryAdsApi::with_demo_catalog();
        let query = TargetQuery {
            campaign_id: Some("camp-xyz".to_string()),
            ad_group_id: None,
        };
        let targets = api.get_optimizable_targets(&query).await.unwrap();
        let ids: Vec<&str> = targets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["tgt-001", "tgt-002"]);
    }

    #[tokio::test]
    async fn test_update_applies_and_rejects_per_target() {
        let mut catalog = demo_catalog();
        catalog[1].state = TargetState::Archived;
        let api = InMemoryAdsApi::new(catalog);

        let request = UpdateBidsRequest {
            adjustments: vec![
                adjustment("kw-001", dec!(0.90)),
                adjustment("kw-002", dec!(1.00)),
                adjustment("kw-404", dec!(1.00)),
                adjustment("tgt-001", Decimal::ZERO),
            ],
        };
        let results = api.update_target_bids(&request).await.unwrap();

        assert_eq!(results.len(), 4);
        assert_eq!(results[0], BidUpdateResult::applied("kw-001"));
        assert_eq!(
            results[1],
            BidUpdateResult::rejected("kw-002", "target is archived")
        );
        assert_eq!(
            results[2],
            BidUpdateResult::rejected("kw-404", "target not found")
        );
        assert!(!results[3].success);

        let stored = api.targets().await;
        assert_eq!(stored[0].current_bid, dec!(0.90));
        assert_eq!(stored[1].current_bid, dec!(1.20));
        assert_eq!(stored[3].current_bid, dec!(0.90));
    }

    #[tokio::test]
    async fn test_updates_are_deterministic() {
        let request = UpdateBidsRequest {
            adjustments: vec![adjustment("kw-001", dec!(0.80))],
        };
        for _ in 0..20 {
            let api = InMemoryAdsApi::with_demo_catalog();
            let results = api.update_target_bids(&request).await.unwrap();
            assert!(results[0].success);
        }
    }
}
