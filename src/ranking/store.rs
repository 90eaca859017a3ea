//! Ranked user store
//!
//! Wraps a [`StatsSource`] and turns its raw snapshots into orderings and rank
//! summaries. Reads never fail from the caller's point of view: a retrieval
//! fault is logged and replaced by a degraded default.

use crate::metrics::MetricsCollector;
use crate::ranking::ordering::RankedOrdering;
use crate::storage::StatsSource;
use crate::types::{RankSummary, StatsWindow, UserId};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of records pulled for an ordering
pub const DEFAULT_FETCH_LIMIT: usize = 100;

/// Read-only view over player statistics, ordered by rank
#[derive(Clone)]
pub struct RankedUserStore {
    source: Arc<dyn StatsSource>,
    metrics: Arc<MetricsCollector>,
    fetch_limit: usize,
}

impl RankedUserStore {
    pub fn new(source: Arc<dyn StatsSource>, metrics: Arc<MetricsCollector>) -> Self {
        Self {
            source,
            metrics,
            fetch_limit: DEFAULT_FETCH_LIMIT,
        }
    }

    /// Override the limit used when a full ordering is needed
    pub fn with_fetch_limit(mut self, fetch_limit: usize) -> Self {
        self.fetch_limit = fetch_limit.max(1);
        self
    }

    pub fn fetch_limit(&self) -> usize {
        self.fetch_limit
    }

    pub fn source(&self) -> Arc<dyn StatsSource> {
        self.source.clone()
    }

    /// Up to `limit` records of `window` in rank order, empty on fault
    pub async fn fetch_ordered(&self, window: StatsWindow, limit: usize) -> RankedOrdering {
        let query = format!("{}_ordered", window);
        let timer = self.metrics.start_timer();

        match self.source.users_by_rank(window, limit).await {
            Ok(records) => {
                self.metrics.record_fetch(&query, true, timer.stop());
                debug!("Fetched {} {} records", records.len(), window);
                // Sources are asked for rank order, but the ordering re-sorts
                // so a sloppy source cannot break it.
                RankedOrdering::from_records(records)
            }
            Err(e) => {
                self.metrics.record_fetch(&query, false, timer.stop());
                warn!("Error fetching {} users: {}", window, e);
                RankedOrdering::empty()
            }
        }
    }

    /// Rank summary of one user within `window`.
    ///
    /// Falls back to rank 1 of 0 with zeroed counters on fault.
    pub async fn fetch_rank_summary(&self, window: StatsWindow, user_id: UserId) -> RankSummary {
        let query = format!("{}_rank", window);
        let timer = self.metrics.start_timer();

        match self.source.users_by_rank(window, usize::MAX).await {
            Ok(records) => {
                self.metrics.record_fetch(&query, true, timer.stop());
                RankedOrdering::from_records(records).summary_for(user_id)
            }
            Err(e) => {
                self.metrics.record_fetch(&query, false, timer.stop());
                warn!("Error getting {} rank for user {}: {}", window, user_id, e);
                RankSummary::degraded(user_id)
            }
        }
    }

    pub async fn fetch_overall_ordered(&self, limit: usize) -> RankedOrdering {
        self.fetch_ordered(StatsWindow::Overall, limit).await
    }

    pub async fn fetch_overall_rank_summary(&self, user_id: UserId) -> RankSummary {
        self.fetch_rank_summary(StatsWindow::Overall, user_id).await
    }

    pub async fn fetch_daily_ordered(&self, limit: usize) -> RankedOrdering {
        self.fetch_ordered(StatsWindow::Daily, limit).await
    }

    pub async fn fetch_daily_rank_summary(&self, user_id: UserId) -> RankSummary {
        self.fetch_rank_summary(StatsWindow::Daily, user_id).await
    }
}
