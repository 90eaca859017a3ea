//! Persistence collaborators
//!
//! The spotlight never writes player statistics; the bot that runs the games
//! owns the schema. These sources only read snapshots.

pub mod memory;
pub mod source;
pub mod sqlite;

pub use memory::InMemoryStatsSource;
pub use source::StatsSource;
pub use sqlite::SqliteStatsSource;
