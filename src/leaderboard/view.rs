//! Paginated leaderboard text
//!
//! Rendering is a pure function of the ordering, the requested page, the page
//! size and the viewer. Out-of-range pages are clamped, so stale controls
//! after the ordering shrinks land on the last page.

use crate::leaderboard::markup::{bold, escape_html};
use crate::ranking::RankedOrdering;
use crate::types::{RankSummary, UserId};
use crate::utils::format_percent;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::ops::Range;

pub const HEADER: &str = "<b>──✦ Player Spotlight ✦──</b>";
pub const SEPARATOR: &str = "<b>────⊱◈◈◈⊰────</b>";
pub const VIEWER_MARKER: &str = "⭐";

/// Medal shown before ranks 1 to 3
pub fn medal_for_rank(rank: usize) -> Option<&'static str> {
    match rank {
        1 => Some("🥇"),
        2 => Some("🥈"),
        3 => Some("🥉"),
        _ => None,
    }
}

/// One page of an ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageView {
    /// 1-based, always within `1..=total_pages`
    pub page: usize,
    pub total_pages: usize,
    pub per_page: usize,
    pub total_users: usize,
}

impl PageView {
    /// Clamp `requested` into range for an ordering of `total_users`
    pub fn new(total_users: usize, per_page: usize, requested: i64) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total_users.div_ceil(per_page).max(1);
        let page = requested.clamp(1, total_pages as i64) as usize;
        Self {
            page,
            total_pages,
            per_page,
            total_users,
        }
    }

    /// Slice of the ordering covered by this page
    pub fn range(&self) -> Range<usize> {
        let start = ((self.page - 1) * self.per_page).min(self.total_users);
        let end = (start + self.per_page).min(self.total_users);
        start..end
    }
}

/// A rendered page and what ended up on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedPage {
    pub text: String,
    /// Clamped page actually shown
    pub page: usize,
    pub total_pages: usize,
    /// User ids on the page, best first
    pub entries: Vec<UserId>,
    /// Set when the viewer is not on the page and a "Your Rank" block was
    /// appended
    pub viewer_summary: Option<RankSummary>,
}

impl RenderedPage {
    pub fn viewer_on_page(&self) -> bool {
        self.viewer_summary.is_none()
    }
}

/// Render one page of `ordering` for `viewer_id`
pub fn render_page(
    ordering: &RankedOrdering,
    page: i64,
    per_page: usize,
    viewer_id: UserId,
) -> RenderedPage {
    render_page_with_viewer(ordering, page, per_page, viewer_id, None)
}

/// Render one page, using `viewer` for the "Your Rank" block instead of
/// locating the viewer in `ordering`. Needed when the ordering was cut at a
/// fetch limit and the viewer ranks below it.
pub fn render_page_with_viewer(
    ordering: &RankedOrdering,
    page: i64,
    per_page: usize,
    viewer_id: UserId,
    viewer: Option<RankSummary>,
) -> RenderedPage {
    let view = PageView::new(ordering.len(), per_page, page);
    let range = view.range();
    let start_rank = range.start + 1;

    let mut text = String::new();
    let _ = write!(text, "{}\n\n", HEADER);

    let mut entries = Vec::with_capacity(range.len());
    for (offset, record) in ordering.records()[range].iter().enumerate() {
        let rank = start_rank + offset;
        let mut prefix = String::new();
        if let Some(medal) = medal_for_rank(rank) {
            prefix.push_str(medal);
            prefix.push(' ');
        }
        if record.user_id == viewer_id {
            prefix.push_str(VIEWER_MARKER);
            prefix.push(' ');
        }

        let _ = writeln!(
            text,
            "{}. {}{} (ID: {})",
            rank,
            prefix,
            bold(&escape_html(record.display_name())),
            record.user_id
        );
        write_counters(
            &mut text,
            record.games_played,
            record.win_percent(),
            record.wins,
            record.losses,
            record.total_score,
            record.penalties,
        );
        let _ = write!(text, "{}\n\n", SEPARATOR);

        entries.push(record.user_id);
    }

    let viewer_summary = if entries.contains(&viewer_id) {
        None
    } else {
        let summary = viewer.unwrap_or_else(|| ordering.summary_for(viewer_id));
        write_viewer_block(&mut text, &summary);
        Some(summary)
    };

    RenderedPage {
        text,
        page: view.page,
        total_pages: view.total_pages,
        entries,
        viewer_summary,
    }
}

fn write_counters(
    text: &mut String,
    games_played: u64,
    win_percent: f64,
    wins: u64,
    losses: u64,
    total_score: u64,
    penalties: u64,
) {
    let _ = writeln!(
        text,
        "   🎮 Games: {} | ⧉ Win%: {}",
        games_played,
        format_percent(win_percent)
    );
    let _ = writeln!(text, "   🏆 Wins: {} | Lost: {}", wins, losses);
    let _ = writeln!(text, "   ⭐ Score: {} | ⛔ Pen: {}", total_score, penalties);
}

fn write_viewer_block(text: &mut String, summary: &RankSummary) {
    let _ = write!(text, "\n\n{}\n", SEPARATOR);
    let _ = writeln!(text, "📌 <b>Your Rank:</b>");
    let _ = writeln!(
        text,
        "{}. {} (ID: {})",
        summary.rank,
        escape_html(&summary.display_name),
        summary.user_id
    );
    write_counters(
        text,
        summary.games_played,
        summary.win_percent,
        summary.wins,
        summary.losses,
        summary.total_score,
        summary.penalties,
    );
}
