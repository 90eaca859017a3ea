//! Rank ordering of player records

use crate::types::{RankSummary, UserId, UserStatRecord};
use std::cmp::Ordering;

/// Compare two records by rank: more wins first, then higher total score
pub fn compare_by_rank(a: &UserStatRecord, b: &UserStatRecord) -> Ordering {
    b.wins
        .cmp(&a.wins)
        .then_with(|| b.total_score.cmp(&a.total_score))
}

/// Sort records into rank order in place. The sort is stable, so remaining
/// ties keep the order the source handed them out in.
pub fn rank_order(records: &mut [UserStatRecord]) {
    records.sort_by(compare_by_rank);
}

/// Immutable, point-in-time ordering of players
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedOrdering {
    records: Vec<UserStatRecord>,
}

impl RankedOrdering {
    /// Build an ordering from records in any order
    pub fn from_records(mut records: Vec<UserStatRecord>) -> Self {
        rank_order(&mut records);
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[UserStatRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at 1-based `rank`
    pub fn at_rank(&self, rank: usize) -> Option<&UserStatRecord> {
        rank.checked_sub(1).and_then(|idx| self.records.get(idx))
    }

    /// 1-based rank of a user, found by linear scan
    pub fn rank_of(&self, user_id: UserId) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.user_id == user_id)
            .map(|idx| idx + 1)
    }

    /// Rank summary of a user against this ordering.
    ///
    /// Users without a record get zeroed counters and `rank = len + 1`.
    pub fn summary_for(&self, user_id: UserId) -> RankSummary {
        let total = self.len();
        match self.rank_of(user_id) {
            Some(rank) => RankSummary::from_record(&self.records[rank - 1], rank, total),
            None => RankSummary::unranked(user_id, total),
        }
    }
}
