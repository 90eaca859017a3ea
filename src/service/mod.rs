//! Service layer: trigger handlers wired to the store and delivery
//!
//! Each trigger runs as an independent task. No lock is held across a store
//! or delivery call.

pub mod app;
pub mod leaderboard;
pub mod rank;
pub mod reply;
pub mod stats;

pub use app::AppState;
pub use leaderboard::{LeaderboardReply, LeaderboardService};
pub use rank::{RankReport, RankService, UserInfoCard};
pub use reply::{CardCollaborators, EditOutcome, ReplySender};
pub use stats::{StatsActionOutcome, StatsService};

use crate::delivery::MessageHandle;
use crate::types::UserId;

/// A button press: who pressed it, on which message, with which token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionContext {
    pub viewer_id: UserId,
    pub message: MessageHandle,
    pub token: String,
}

impl ActionContext {
    pub fn new(viewer_id: UserId, message: MessageHandle, token: impl Into<String>) -> Self {
        Self {
            viewer_id,
            message,
            token: token.into(),
        }
    }
}
