//! SQLite-backed stats source
//!
//! Every read opens its own connection on the blocking pool and closes it when
//! done. The busy timeout is the only bound on a stalled read.

use crate::error::{Result, SpotlightError};
use crate::stats::{AggregateSnapshot, GroupActivity, TopPlayer, TOP_PLAYER_COUNT};
use crate::storage::source::StatsSource;
use crate::types::{GameRecord, GroupRecord, StatsWindow, UserStatRecord};
use crate::utils::days_ago;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error};

/// Timestamp layout used by the bot's tables
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Columns every stats table must have, with the type they are added as
const STAT_COLUMNS: &[(&str, &str)] = &[
    ("username", "TEXT"),
    ("first_name", "TEXT"),
    ("games_played", "INTEGER DEFAULT 0"),
    ("wins", "INTEGER DEFAULT 0"),
    ("losses", "INTEGER DEFAULT 0"),
    ("rounds_played", "INTEGER DEFAULT 0"),
    ("eliminations", "INTEGER DEFAULT 0"),
    ("total_score", "INTEGER DEFAULT 0"),
    ("penalties", "INTEGER DEFAULT 0"),
    ("created_at", "TEXT"),
    ("updated_at", "TEXT"),
];

/// Stats source reading the bot's SQLite database
#[derive(Debug, Clone)]
pub struct SqliteStatsSource {
    path: PathBuf,
    busy_timeout: Duration,
    storage_quota_mb: f64,
}

impl SqliteStatsSource {
    pub fn new(path: impl Into<PathBuf>, busy_timeout: Duration, storage_quota_mb: f64) -> Self {
        Self {
            path: path.into(),
            busy_timeout,
            storage_quota_mb,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(path: &Path, busy_timeout: Duration) -> rusqlite::Result<Connection> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        Ok(conn)
    }

    /// Create every table the source reads from
    pub fn init_schema(&self) -> Result<()> {
        let conn = Self::open(&self.path, self.busy_timeout)?;
        init_schema_sync(&conn)?;
        Ok(())
    }

    /// Insert or replace a stats row in the table of `window`
    pub fn upsert_user(&self, window: StatsWindow, record: &UserStatRecord) -> Result<()> {
        let conn = Self::open(&self.path, self.busy_timeout)?;
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} (user_id, username, first_name, games_played, wins, \
                 losses, rounds_played, eliminations, total_score, penalties, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                table_for(window)
            ),
            params![
                record.user_id,
                record.username,
                record.first_name,
                record.games_played as i64,
                record.wins as i64,
                record.losses as i64,
                record.rounds_played as i64,
                record.eliminations as i64,
                record.total_score as i64,
                record.penalties as i64,
                record.created_at.map(format_timestamp),
                record.updated_at.map(format_timestamp),
            ],
        )?;
        Ok(())
    }

    pub fn insert_group(&self, group: &GroupRecord) -> Result<()> {
        let conn = Self::open(&self.path, self.busy_timeout)?;
        conn.execute(
            "INSERT OR REPLACE INTO groups (group_id, title, games_played) VALUES (?1, ?2, ?3)",
            params![group.group_id, group.title, group.games_played as i64],
        )?;
        Ok(())
    }

    pub fn insert_game(&self, game: &GameRecord) -> Result<()> {
        let conn = Self::open(&self.path, self.busy_timeout)?;
        conn.execute(
            "INSERT OR REPLACE INTO games (game_id, group_id, ended_at) VALUES (?1, ?2, ?3)",
            params![game.game_id, game.group_id, game.ended_at.map(format_timestamp)],
        )?;
        Ok(())
    }

    /// Run `f` against a fresh connection on the blocking pool
    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        let busy_timeout = self.busy_timeout;
        tokio::task::spawn_blocking(move || {
            let conn = Self::open(&path, busy_timeout).map_err(SpotlightError::retrieval)?;
            f(&conn)
        })
        .await
        .map_err(|e| SpotlightError::InternalError {
            message: format!("Blocking read task failed: {}", e),
        })?
    }
}

fn table_for(window: StatsWindow) -> &'static str {
    match window {
        StatsWindow::Overall => "users",
        StatsWindow::Daily => "daily_stats",
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).ok())
        .map(|naive| naive.and_utc())
}

fn stats_table_ddl(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (
            user_id INTEGER PRIMARY KEY,
            username TEXT,
            first_name TEXT,
            games_played INTEGER DEFAULT 0,
            wins INTEGER DEFAULT 0,
            losses INTEGER DEFAULT 0,
            rounds_played INTEGER DEFAULT 0,
            eliminations INTEGER DEFAULT 0,
            total_score INTEGER DEFAULT 0,
            penalties INTEGER DEFAULT 0,
            created_at TEXT,
            updated_at TEXT
        );",
        table
    )
}

fn init_schema_sync(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(&stats_table_ddl("users"))?;
    conn.execute_batch(&stats_table_ddl("daily_stats"))?;
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS groups (
            group_id INTEGER PRIMARY KEY,
            title TEXT,
            games_played INTEGER DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS games (
            game_id INTEGER PRIMARY KEY,
            group_id INTEGER,
            ended_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_games_ended_at ON games(ended_at);
        ",
    )?;
    Ok(())
}

/// Add any stats column an older schema is missing
fn ensure_columns_exist(conn: &Connection, table: &str) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let existing: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<_>>()?;

    for (column, kind) in STAT_COLUMNS {
        if !existing.iter().any(|c| c == column) {
            debug!("Adding missing column {}.{}", table, column);
            conn.execute_batch(&format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, kind))?;
        }
    }
    Ok(())
}

fn counter(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    Ok(row.get::<_, i64>(idx)?.max(0) as u64)
}

fn non_empty(raw: String) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw)
    }
}

fn read_users_sync(
    conn: &Connection,
    window: StatsWindow,
    limit: usize,
) -> rusqlite::Result<Vec<UserStatRecord>> {
    let table = table_for(window);
    ensure_columns_exist(conn, table)?;

    let mut stmt = conn.prepare(&format!(
        "SELECT
            user_id,
            IFNULL(username, '') AS username,
            IFNULL(first_name, '') AS first_name,
            IFNULL(games_played, 0) AS games_played,
            IFNULL(wins, 0) AS wins,
            IFNULL(losses, 0) AS losses,
            IFNULL(rounds_played, 0) AS rounds_played,
            IFNULL(eliminations, 0) AS eliminations,
            IFNULL(total_score, 0) AS total_score,
            IFNULL(penalties, 0) AS penalties,
            created_at,
            updated_at
        FROM {}
        ORDER BY wins DESC, total_score DESC
        LIMIT ?1",
        table
    ))?;

    // A negative LIMIT means no limit
    let limit = i64::try_from(limit).unwrap_or(-1);
    let rows = stmt.query_map(params![limit], |row| {
        Ok(UserStatRecord {
            user_id: row.get(0)?,
            username: non_empty(row.get(1)?),
            first_name: non_empty(row.get(2)?),
            games_played: counter(row, 3)?,
            wins: counter(row, 4)?,
            losses: counter(row, 5)?,
            rounds_played: counter(row, 6)?,
            eliminations: counter(row, 7)?,
            total_score: counter(row, 8)?,
            penalties: counter(row, 9)?,
            created_at: parse_timestamp(row.get(10)?),
            updated_at: parse_timestamp(row.get(11)?),
        })
    })?;

    rows.collect()
}

/// Single-value query that logs and falls back to the default on failure
fn scalar_or_default<T, P>(conn: &Connection, label: &str, sql: &str, params: P) -> T
where
    T: rusqlite::types::FromSql + Default,
    P: Params,
{
    match conn.query_row(sql, params, |row| row.get::<_, Option<T>>(0)) {
        Ok(value) => value.unwrap_or_default(),
        Err(e) => {
            error!("Error fetching {}: {}", label, e);
            T::default()
        }
    }
}

fn count(conn: &Connection, label: &str, sql: &str, params: impl Params) -> u64 {
    scalar_or_default::<i64, _>(conn, label, sql, params).max(0) as u64
}

fn aggregates_sync(
    conn: &Connection,
    path: &Path,
    storage_quota_mb: f64,
    now: DateTime<Utc>,
) -> AggregateSnapshot {
    let week_ago = format_timestamp(days_ago(now, 7));
    let day_ago = format_timestamp(days_ago(now, 1));

    let mut snapshot = AggregateSnapshot {
        storage_quota_mb,
        ..Default::default()
    };

    snapshot.total_users = count(conn, "total_users", "SELECT COUNT(*) FROM users", []);
    snapshot.total_groups = count(conn, "total_groups", "SELECT COUNT(*) FROM groups", []);
    snapshot.games_recorded = count(conn, "total_games", "SELECT COUNT(*) FROM games", []);

    match conn.query_row(
        "SELECT COALESCE(SUM(wins),0), COALESCE(SUM(losses),0), \
         COALESCE(SUM(games_played),0), COALESCE(SUM(penalties),0) FROM users",
        [],
        |row| Ok((counter(row, 0)?, counter(row, 1)?, counter(row, 2)?, counter(row, 3)?)),
    ) {
        Ok((wins, losses, games, penalties)) => {
            snapshot.total_wins = wins;
            snapshot.total_losses = losses;
            snapshot.total_games_played = games;
            snapshot.total_penalties = penalties;
        }
        Err(e) => error!("Error fetching user sums: {}", e),
    }

    match std::fs::metadata(path) {
        Ok(meta) => snapshot.database_size_mb = meta.len() as f64 / (1024.0 * 1024.0),
        Err(e) => error!("Error fetching DB size: {}", e),
    }

    snapshot.active_users_7d = count(
        conn,
        "active_users",
        "SELECT COUNT(DISTINCT user_id) FROM users WHERE updated_at IS NOT NULL AND updated_at >= ?1",
        params![week_ago],
    );
    snapshot.games_last_24h = count(
        conn,
        "recent_games",
        "SELECT COUNT(*) FROM games WHERE ended_at >= ?1",
        params![day_ago],
    );

    snapshot.top_players = read_top_players(conn)
        .map_err(|e| error!("Error fetching top_players: {}", e))
        .ok();

    snapshot.average_score = scalar_or_default::<f64, _>(
        conn,
        "avg_score",
        "SELECT COALESCE(AVG(total_score),0) FROM users",
        [],
    );

    snapshot.most_active_group = conn
        .query_row(
            "SELECT title, group_id, IFNULL(games_played, 0) FROM groups \
             ORDER BY games_played DESC LIMIT 1",
            [],
            |row| {
                Ok(GroupActivity {
                    title: row.get(0)?,
                    group_id: row.get(1)?,
                    games_played: counter(row, 2)?,
                })
            },
        )
        .optional()
        .unwrap_or_else(|e| {
            error!("Error fetching most_active_group: {}", e);
            None
        })
        .filter(|g| g.games_played > 0);

    snapshot.inactive_users = count(
        conn,
        "inactive_users",
        "SELECT COUNT(*) FROM users WHERE COALESCE(games_played,0) = 0",
        [],
    );
    snapshot.registrations_7d = count(
        conn,
        "recent_registrations",
        "SELECT COUNT(*) FROM users WHERE created_at IS NOT NULL AND created_at >= ?1",
        params![week_ago],
    );

    snapshot
}

fn read_top_players(conn: &Connection) -> rusqlite::Result<Vec<TopPlayer>> {
    let mut stmt = conn.prepare(
        "SELECT first_name, username, IFNULL(wins, 0) FROM users \
         ORDER BY wins DESC, total_score DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![TOP_PLAYER_COUNT as i64], |row| {
        Ok(TopPlayer {
            first_name: row.get::<_, Option<String>>(0)?.and_then(non_empty),
            username: row.get::<_, Option<String>>(1)?.and_then(non_empty),
            wins: counter(row, 2)?,
        })
    })?;
    rows.collect()
}

#[async_trait]
impl StatsSource for SqliteStatsSource {
    async fn users_by_rank(
        &self,
        window: StatsWindow,
        limit: usize,
    ) -> Result<Vec<UserStatRecord>> {
        self.with_connection(move |conn| {
            read_users_sync(conn, window, limit).map_err(|e| SpotlightError::retrieval(e).into())
        })
        .await
    }

    async fn aggregates(&self, now: DateTime<Utc>) -> Result<AggregateSnapshot> {
        let path = self.path.clone();
        let quota = self.storage_quota_mb;
        self.with_connection(move |conn| Ok(aggregates_sync(conn, &path, quota, now)))
            .await
    }
}
