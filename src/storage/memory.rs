//! In-memory stats source for tests and demos

use crate::error::{Result, SpotlightError};
use crate::ranking::ordering::rank_order;
use crate::stats::{AggregateSnapshot, GroupActivity, TopPlayer, TOP_PLAYER_COUNT};
use crate::storage::source::StatsSource;
use crate::types::{GameRecord, GroupRecord, StatsWindow, UserStatRecord};
use crate::utils::days_ago;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Stats source backed by plain vectors.
///
/// `set_failing(true)` makes every query return a retrieval fault, which is
/// how tests exercise the degraded paths.
#[derive(Debug, Default)]
pub struct InMemoryStatsSource {
    users: RwLock<Vec<UserStatRecord>>,
    daily: RwLock<Vec<UserStatRecord>>,
    groups: RwLock<Vec<GroupRecord>>,
    games: RwLock<Vec<GameRecord>>,
    failing: AtomicBool,
}

impl InMemoryStatsSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source preloaded with overall and daily records
    pub fn with_users(users: Vec<UserStatRecord>, daily: Vec<UserStatRecord>) -> Self {
        let source = Self::new();
        source.replace_users(StatsWindow::Overall, users);
        source.replace_users(StatsWindow::Daily, daily);
        source
    }

    /// Replace every record of a window
    pub fn replace_users(&self, window: StatsWindow, records: Vec<UserStatRecord>) {
        if let Ok(mut users) = self.window(window).write() {
            *users = records;
        }
    }

    /// Insert or overwrite a single record
    pub fn upsert_user(&self, window: StatsWindow, record: UserStatRecord) {
        if let Ok(mut users) = self.window(window).write() {
            match users.iter_mut().find(|u| u.user_id == record.user_id) {
                Some(existing) => *existing = record,
                None => users.push(record),
            }
        }
    }

    pub fn add_group(&self, group: GroupRecord) {
        if let Ok(mut groups) = self.groups.write() {
            groups.push(group);
        }
    }

    pub fn add_game(&self, game: GameRecord) {
        if let Ok(mut games) = self.games.write() {
            games.push(game);
        }
    }

    /// Toggle retrieval-fault simulation
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn window(&self, window: StatsWindow) -> &RwLock<Vec<UserStatRecord>> {
        match window {
            StatsWindow::Overall => &self.users,
            StatsWindow::Daily => &self.daily,
        }
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SpotlightError::retrieval("in-memory source marked as failing").into());
        }
        Ok(())
    }

    fn lock_poisoned(what: &str) -> SpotlightError {
        SpotlightError::InternalError {
            message: format!("Failed to acquire {} read lock", what),
        }
    }
}

#[async_trait]
impl StatsSource for InMemoryStatsSource {
    async fn users_by_rank(
        &self,
        window: StatsWindow,
        limit: usize,
    ) -> Result<Vec<UserStatRecord>> {
        self.check_available()?;

        let mut records = self
            .window(window)
            .read()
            .map_err(|_| Self::lock_poisoned("users"))?
            .clone();
        rank_order(&mut records);
        records.truncate(limit);
        Ok(records)
    }

    async fn aggregates(&self, now: DateTime<Utc>) -> Result<AggregateSnapshot> {
        self.check_available()?;

        let users = self.users.read().map_err(|_| Self::lock_poisoned("users"))?;
        let groups = self.groups.read().map_err(|_| Self::lock_poisoned("groups"))?;
        let games = self.games.read().map_err(|_| Self::lock_poisoned("games"))?;

        let week_ago = days_ago(now, 7);
        let day_ago = days_ago(now, 1);

        let mut ranked = users.clone();
        rank_order(&mut ranked);
        let top_players = ranked
            .iter()
            .take(TOP_PLAYER_COUNT)
            .map(|u| TopPlayer {
                first_name: u.first_name.clone(),
                username: u.username.clone(),
                wins: u.wins,
            })
            .collect();

        // First group wins ties, same as a stable sort would
        let most_active_group = groups
            .iter()
            .fold(None::<&GroupRecord>, |best, g| match best {
                Some(b) if b.games_played >= g.games_played => Some(b),
                _ => Some(g),
            })
            .filter(|g| g.games_played > 0)
            .map(|g| GroupActivity {
                group_id: g.group_id,
                title: g.title.clone(),
                games_played: g.games_played,
            });

        let average_score = if users.is_empty() {
            0.0
        } else {
            users.iter().map(|u| u.total_score as f64).sum::<f64>() / users.len() as f64
        };

        Ok(AggregateSnapshot {
            total_users: users.len() as u64,
            total_groups: groups.len() as u64,
            games_recorded: games.len() as u64,
            total_wins: users.iter().map(|u| u.wins).sum(),
            total_losses: users.iter().map(|u| u.losses).sum(),
            total_games_played: users.iter().map(|u| u.games_played).sum(),
            total_penalties: users.iter().map(|u| u.penalties).sum(),
            database_size_mb: 0.0,
            storage_quota_mb: 0.0,
            active_users_7d: users
                .iter()
                .filter(|u| u.updated_at.is_some_and(|t| t >= week_ago))
                .count() as u64,
            games_last_24h: games
                .iter()
                .filter(|g| g.ended_at.is_some_and(|t| t >= day_ago))
                .count() as u64,
            top_players: Some(top_players),
            average_score,
            most_active_group,
            inactive_users: users.iter().filter(|u| u.games_played == 0).count() as u64,
            registrations_7d: users
                .iter()
                .filter(|u| u.created_at.is_some_and(|t| t >= week_ago))
                .count() as u64,
        })
    }
}
