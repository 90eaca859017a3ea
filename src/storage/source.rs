//! Persistence collaborator interface
//!
//! A source hands out raw snapshots. Ordering rules and fault recovery live in
//! [`crate::ranking::RankedUserStore`], so a source is free to return errors.

use crate::error::Result;
use crate::stats::AggregateSnapshot;
use crate::types::{StatsWindow, UserStatRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Trait for reading player statistics
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Up to `limit` records of `window`, best first (wins, then total score)
    async fn users_by_rank(
        &self,
        window: StatsWindow,
        limit: usize,
    ) -> Result<Vec<UserStatRecord>>;

    /// Aggregate statistics as of `now`
    async fn aggregates(&self, now: DateTime<Utc>) -> Result<AggregateSnapshot>;
}
