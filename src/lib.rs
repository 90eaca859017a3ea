//! Player Spotlight - leaderboard and rank backend for a chat game bot
//!
//! This crate ranks players by wins and total score, renders paginated
//! leaderboards that locate the viewer, reports per-user ranks for the overall
//! and daily windows, and summarises aggregate bot statistics. Message
//! delivery, card images and schema ownership stay with external
//! collaborators behind traits.

pub mod config;
pub mod delivery;
pub mod error;
pub mod leaderboard;
pub mod metrics;
pub mod ranking;
pub mod service;
pub mod stats;
pub mod storage;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Result, SpotlightError};
pub use types::*;

// Re-export key components
pub use delivery::{Delivery, DeliveryError, MessageHandle};
pub use leaderboard::{build_pager, render_page, PagerSpec};
pub use ranking::{RankedOrdering, RankedUserStore};
pub use service::AppState;
pub use storage::{InMemoryStatsSource, SqliteStatsSource, StatsSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
