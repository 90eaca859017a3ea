//! Stats categories and their texts

use crate::delivery::{ActionButton, Keyboard};
use crate::leaderboard::escape_html;
use crate::stats::snapshot::{AggregateSnapshot, TopPlayer};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Prefix of every stats category action token
pub const STATS_ACTION_PREFIX: &str = "stats_";

/// One detail page of the stats overview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsCategory {
    Bot,
    Users,
    Groups,
    TopPlayers,
}

impl StatsCategory {
    pub const ALL: [StatsCategory; 4] = [
        StatsCategory::Bot,
        StatsCategory::Users,
        StatsCategory::Groups,
        StatsCategory::TopPlayers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatsCategory::Bot => "bot",
            StatsCategory::Users => "users",
            StatsCategory::Groups => "groups",
            StatsCategory::TopPlayers => "top_players",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatsCategory::Bot => "📊 Bot Stats",
            StatsCategory::Users => "👥 User Stats",
            StatsCategory::Groups => "🏘 Group Stats",
            StatsCategory::TopPlayers => "🌟 Top Players",
        }
    }

    /// Token selecting this category
    pub fn action(&self) -> String {
        format!("{}{}", STATS_ACTION_PREFIX, self.as_str())
    }

    /// Parse a `stats_{category}` token
    pub fn from_action(token: &str) -> Option<Self> {
        token.strip_prefix(STATS_ACTION_PREFIX)?.parse().ok()
    }

    /// Detail text for this category
    pub fn render(&self, snapshot: &AggregateSnapshot) -> String {
        match self {
            StatsCategory::Bot => format!(
                "<b>Bot Stats</b>\n\n\
                 💾 Storage: {:.2} MB ({:.1}% of {} MB)\n\
                 🎮 Total Games: {}\n\
                 🏆 Win Rate: {:.1}%",
                snapshot.database_size_mb,
                snapshot.storage_percentage(),
                snapshot.storage_quota_mb,
                snapshot.total_games_played,
                snapshot.win_rate()
            ),
            StatsCategory::Users => format!(
                "<b>User Stats</b>\n\n\
                 👥 Total Users: {}\n\
                 🕒 Active Users (7 days): {}\n\
                 😴 Inactive Users: {}\n\
                 🆕 New Users (7 days): {}\n\
                 🎮 Avg. Games/User: {:.1}\n\
                 📊 Avg. Score: {:.1}",
                snapshot.total_users,
                snapshot.active_users_7d,
                snapshot.inactive_users,
                snapshot.registrations_7d,
                snapshot.average_games_per_user(),
                snapshot.average_score
            ),
            StatsCategory::Groups => {
                let most_active = match &snapshot.most_active_group {
                    Some(group) => format!(
                        "{} (ID: {}, Games: {})",
                        escape_html(group.title.as_deref().unwrap_or("Unknown")),
                        group.group_id,
                        group.games_played
                    ),
                    None => "No games played yet.".to_string(),
                };
                format!(
                    "<b>Group Stats</b>\n\n\
                     🏘 Total Groups: {}\n\
                     🔥 Active Groups (24h): {}\n\
                     🏆 Most Active Group: {}",
                    snapshot.total_groups, snapshot.games_last_24h, most_active
                )
            }
            StatsCategory::TopPlayers => format!(
                "<b>Top 3 Players</b>\n\n\
                 {}\n\n\
                 ⚠️ Total Penalties: {}\n\
                 🏆 Total Wins: {}\n\
                 ❌ Total Losses: {}",
                top_players_text(snapshot.top_players.as_deref()),
                snapshot.total_penalties,
                snapshot.total_wins,
                snapshot.total_losses
            ),
        }
    }
}

impl std::fmt::Display for StatsCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StatsCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bot" => Ok(StatsCategory::Bot),
            "users" => Ok(StatsCategory::Users),
            "groups" => Ok(StatsCategory::Groups),
            "top_players" => Ok(StatsCategory::TopPlayers),
            other => Err(format!("Unknown stats category: {}", other)),
        }
    }
}

/// Players without a first name are listed as "Player"; the username, when
/// known, always follows in parentheses.
fn top_players_text(players: Option<&[TopPlayer]>) -> String {
    let players = match players {
        None => return "N/A".to_string(),
        Some([]) => return "No players with wins yet.".to_string(),
        Some(players) => players,
    };

    let mut text = String::new();
    for (idx, player) in players.iter().enumerate() {
        if idx > 0 {
            text.push('\n');
        }
        let name = escape_html(player.first_name.as_deref().unwrap_or("Player"));
        let _ = write!(text, "{}. {}", idx + 1, name);
        if let Some(username) = &player.username {
            let _ = write!(text, " (@{})", escape_html(username));
        }
        let _ = write!(text, " - {} wins", player.wins);
    }
    text
}

/// Overview text listing users, groups and recorded games
pub fn overview_text(snapshot: &AggregateSnapshot) -> String {
    format!(
        "<b>Bot Statistics</b>\n\n\
         👥 Users: {}\n\
         🏘 Groups: {}\n\
         🎮 Games Played: {}\n\n\
         Select a category for details:",
        snapshot.total_users, snapshot.total_groups, snapshot.games_recorded
    )
}

/// Two rows of category buttons
pub fn stats_keyboard() -> Keyboard {
    let buttons: Vec<ActionButton> = StatsCategory::ALL
        .iter()
        .map(|c| ActionButton::new(c.label(), c.action()))
        .collect();
    Keyboard::new(buttons.chunks(2).map(|row| row.to_vec()).collect())
}
