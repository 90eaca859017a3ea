//! Point-in-time aggregate statistics over the whole player base

use crate::types::ChatId;
use crate::utils::percent_of;
use serde::{Deserialize, Serialize};

/// Number of players listed in the top players section
pub const TOP_PLAYER_COUNT: usize = 3;

/// Entry in the top players section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopPlayer {
    pub first_name: Option<String>,
    pub username: Option<String>,
    pub wins: u64,
}

/// The group with the most games played
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupActivity {
    pub group_id: ChatId,
    pub title: Option<String>,
    pub games_played: u64,
}

/// Aggregate statistics collected in one pass over the source.
///
/// Every field is fetched independently; a piece that failed to load keeps its
/// default value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    pub total_users: u64,
    pub total_groups: u64,
    /// Rows in the games table
    pub games_recorded: u64,
    pub total_wins: u64,
    pub total_losses: u64,
    /// Sum of every player's games played
    pub total_games_played: u64,
    pub total_penalties: u64,
    pub database_size_mb: f64,
    pub storage_quota_mb: f64,
    /// Users with counter updates in the last 7 days
    pub active_users_7d: u64,
    /// Games that ended in the last 24 hours
    pub games_last_24h: u64,
    /// `None` when the lookup itself failed
    pub top_players: Option<Vec<TopPlayer>>,
    pub average_score: f64,
    /// Only set when that group has at least one game
    pub most_active_group: Option<GroupActivity>,
    pub inactive_users: u64,
    pub registrations_7d: u64,
}

impl AggregateSnapshot {
    pub fn average_games_per_user(&self) -> f64 {
        if self.total_users == 0 {
            return 0.0;
        }
        self.total_games_played as f64 / self.total_users as f64
    }

    pub fn win_rate(&self) -> f64 {
        percent_of(self.total_wins, self.total_games_played)
    }

    pub fn storage_percentage(&self) -> f64 {
        if self.storage_quota_mb <= 0.0 {
            return 0.0;
        }
        self.database_size_mb / self.storage_quota_mb * 100.0
    }
}
