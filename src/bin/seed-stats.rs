//! Seed Stats CLI Tool
//!
//! Creates the stats tables in a SQLite database and fills them with
//! deterministic sample players, groups and games.
//!
//! Usage:
//!   cargo run --bin seed-stats -- --database spotlight.db --players 12
//!   cargo run --bin player-spotlight -- --database spotlight.db leaderboard --viewer 7

use anyhow::Result;
use chrono::Duration;
use clap::Parser;
use player_spotlight::storage::SqliteStatsSource;
use player_spotlight::types::{GameRecord, GroupRecord, StatsWindow, UserStatRecord};
use player_spotlight::utils::current_timestamp;
use std::path::PathBuf;
use std::time::Duration as StdDuration;
use tracing::info;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Bruno", "Chiara", "Dmitri", "Esi", "Farah", "Goro", "Hana", "Ivo", "Jun", "Kofi",
    "Lena",
];

#[derive(Parser)]
#[command(name = "seed-stats")]
#[command(about = "Create the stats schema and fill it with deterministic sample data")]
struct Cli {
    /// SQLite database to create or extend
    #[arg(long, default_value = "spotlight.db")]
    database: PathBuf,

    /// Number of sample players
    #[arg(long, default_value_t = 12)]
    players: u64,

    /// Number of sample groups
    #[arg(long, default_value_t = 3)]
    groups: u64,
}

/// Deterministic counters for the `n`th player (1-based)
fn sample_player(n: u64, daily: bool) -> UserStatRecord {
    let now = current_timestamp();
    let scale = if daily { 1 } else { 5 };
    let games_played = ((n * 7) % 11 + 1) * scale;
    let wins = ((n * 5) % 7).min(games_played);
    let losses = games_played - wins;

    UserStatRecord {
        user_id: 1000 + n as i64,
        username: (n % 3 != 0).then(|| format!("player{}", n)),
        first_name: (n % 4 != 0).then(|| FIRST_NAMES[(n as usize - 1) % FIRST_NAMES.len()].to_string()),
        games_played,
        wins,
        losses,
        rounds_played: games_played * 3,
        eliminations: (n * 2) % 9,
        total_score: wins * 10 + (n * 13) % 17,
        penalties: n % 3,
        created_at: Some(now - Duration::days((n % 10) as i64)),
        updated_at: Some(now - Duration::hours((n * 9 % 200) as i64)),
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let source = SqliteStatsSource::new(&cli.database, StdDuration::from_secs(10), 500.0);
    source.init_schema()?;

    for n in 1..=cli.players {
        source.upsert_user(StatsWindow::Overall, &sample_player(n, false))?;
        if n % 2 == 1 {
            source.upsert_user(StatsWindow::Daily, &sample_player(n, true))?;
        }
    }

    let now = current_timestamp();
    let mut game_id = 1;
    for g in 1..=cli.groups {
        let games_played = g * 4;
        source.insert_group(&GroupRecord {
            group_id: -100_000 - g as i64,
            title: Some(format!("Game Night #{}", g)),
            games_played,
        })?;
        for k in 0..games_played {
            source.insert_game(&GameRecord {
                game_id,
                group_id: -100_000 - g as i64,
                ended_at: Some(now - Duration::hours((k * 7) as i64)),
            })?;
            game_id += 1;
        }
    }

    info!(
        "Seeded {} players and {} groups into {}",
        cli.players,
        cli.groups,
        cli.database.display()
    );
    Ok(())
}
