//! Common types used throughout the spotlight service

use crate::utils::{percent_of, round_to_tenth};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of a player in the chat platform
pub type UserId = i64;

/// Identifier of a chat (private conversation or group)
pub type ChatId = i64;

/// Display name used when neither a first name nor a username is known
pub const UNKNOWN_NAME: &str = "Unknown";

/// Statistics snapshot for one player
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatRecord {
    pub user_id: UserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub games_played: u64,
    pub wins: u64,
    pub losses: u64,
    pub rounds_played: u64,
    pub eliminations: u64,
    pub total_score: u64,
    pub penalties: u64,
    /// First time the player was seen (aggregate statistics only)
    pub created_at: Option<DateTime<Utc>>,
    /// Last counter update (aggregate statistics only)
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserStatRecord {
    /// Create an all-zero record for a player
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    /// Resolve the name shown for this player: first name, then username,
    /// then [`UNKNOWN_NAME`]. Empty strings count as absent.
    pub fn display_name(&self) -> &str {
        resolve_display_name(self.first_name.as_deref(), self.username.as_deref())
    }

    /// Win percentage rounded to one decimal, 0 when no games were played
    pub fn win_percent(&self) -> f64 {
        win_percent(self.wins, self.games_played)
    }
}

/// Ordered name resolution shared by every view
pub fn resolve_display_name<'a>(first_name: Option<&'a str>, username: Option<&'a str>) -> &'a str {
    [first_name, username]
        .into_iter()
        .flatten()
        .find(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_NAME)
}

/// `round(wins / games_played * 100, 1)`, exactly 0 for zero games
pub fn win_percent(wins: u64, games_played: u64) -> f64 {
    if games_played == 0 {
        return 0.0;
    }
    round_to_tenth(percent_of(wins, games_played))
}

/// Which statistics window an ordering is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsWindow {
    /// All-time counters
    Overall,
    /// Counters since the last daily reset
    Daily,
}

impl std::fmt::Display for StatsWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsWindow::Overall => write!(f, "overall"),
            StatsWindow::Daily => write!(f, "daily"),
        }
    }
}

/// A group chat the bot has run games in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub group_id: ChatId,
    pub title: Option<String>,
    pub games_played: u64,
}

/// One finished (or running) game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: i64,
    pub group_id: ChatId,
    pub ended_at: Option<DateTime<Utc>>,
}

/// A user's position within one ordering plus their counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankSummary {
    pub user_id: UserId,
    pub display_name: String,
    /// 1-based rank; `total_users + 1` for users missing from the ordering
    pub rank: usize,
    pub total_users: usize,
    pub games_played: u64,
    pub wins: u64,
    pub losses: u64,
    pub win_percent: f64,
    pub rounds_played: u64,
    pub eliminations: u64,
    pub total_score: u64,
    pub penalties: u64,
}

impl RankSummary {
    /// Summary for a record found at `rank`
    pub fn from_record(record: &UserStatRecord, rank: usize, total_users: usize) -> Self {
        Self {
            user_id: record.user_id,
            display_name: record.display_name().to_string(),
            rank,
            total_users,
            games_played: record.games_played,
            wins: record.wins,
            losses: record.losses,
            win_percent: record.win_percent(),
            rounds_played: record.rounds_played,
            eliminations: record.eliminations,
            total_score: record.total_score,
            penalties: record.penalties,
        }
    }

    /// Summary for a user with no record in an ordering of `total_users`
    pub fn unranked(user_id: UserId, total_users: usize) -> Self {
        Self::from_record(&UserStatRecord::new(user_id), total_users + 1, total_users)
    }

    /// Fallback used when the ordering could not be retrieved at all
    pub fn degraded(user_id: UserId) -> Self {
        Self::from_record(&UserStatRecord::new(user_id), 1, 0)
    }

    /// Whether the user actually appears in the ordering
    pub fn is_ranked(&self) -> bool {
        self.rank <= self.total_users
    }
}
