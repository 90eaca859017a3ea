//! Decorative card images
//!
//! Cards are optional. Any failure here means the reply goes out as plain
//! text with the same content.

use crate::types::UserId;
use async_trait::async_trait;
use std::path::PathBuf;

/// Which card template to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardKind {
    Leaderboard,
    DailyLeaderboard,
    UserInfo,
}

impl std::fmt::Display for CardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardKind::Leaderboard => write!(f, "leaderboard"),
            CardKind::DailyLeaderboard => write!(f, "daily_leaderboard"),
            CardKind::UserInfo => write!(f, "userinfo"),
        }
    }
}

/// Trait for drawing card images
#[async_trait]
pub trait CardRenderer: Send + Sync {
    /// Encoded image bytes for `kind`, drawn around `avatar` when given
    async fn render_card(&self, kind: CardKind, avatar: Option<PathBuf>) -> anyhow::Result<Vec<u8>>;
}

/// Trait for downloading profile photos
#[async_trait]
pub trait AvatarSource: Send + Sync {
    /// Local path of the user's photo, `None` when they have none
    async fn fetch_avatar(&self, user_id: UserId) -> anyhow::Result<Option<PathBuf>>;
}
