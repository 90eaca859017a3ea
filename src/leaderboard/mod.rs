//! Leaderboard views: page rendering, markup and pagination controls

pub mod markup;
pub mod pager;
pub mod view;

pub use markup::escape_html;
pub use pager::{build_pager, parse_page_action, PagerSpec};
pub use view::{medal_for_rank, render_page, render_page_with_viewer, PageView, RenderedPage};

use crate::types::StatsWindow;

/// Action prefix of the board showing `window`
pub fn action_prefix(window: StatsWindow) -> &'static str {
    match window {
        StatsWindow::Overall => "leaderboard",
        StatsWindow::Daily => "daily_leaderboard",
    }
}

/// Placeholder sent while an initial board is being prepared
pub fn loading_text(window: StatsWindow) -> &'static str {
    match window {
        StatsWindow::Overall => "⏳ Loading leaderboard...",
        StatsWindow::Daily => "⏳ Loading daily leaderboard...",
    }
}
