//! Aggregate bot, user and group statistics

pub mod category;
pub mod session;
pub mod snapshot;

pub use category::{overview_text, stats_keyboard, StatsCategory};
pub use session::StatsSessions;
pub use snapshot::{AggregateSnapshot, GroupActivity, TopPlayer, TOP_PLAYER_COUNT};
