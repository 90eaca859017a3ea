//! Pagination controls and action token grammar
//!
//! A page action token is `{prefix}_{integer}`. The page indicator carries
//! `{prefix}:nop`, which never parses as a page action.

use crate::delivery::{ActionButton, Keyboard};
use serde::{Deserialize, Serialize};

pub const PREVIOUS_LABEL: &str = "◄ Previous";
pub const NEXT_LABEL: &str = "Next ►";

/// Navigation row plus a non-actionable "Page X/Y" indicator row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagerSpec {
    pub navigation: Vec<ActionButton>,
    pub indicator: ActionButton,
}

impl PagerSpec {
    pub fn previous(&self) -> Option<&ActionButton> {
        self.navigation.iter().find(|c| c.label == PREVIOUS_LABEL)
    }

    pub fn next(&self) -> Option<&ActionButton> {
        self.navigation.iter().find(|c| c.label == NEXT_LABEL)
    }

    /// Navigation row (when any control applies) above the indicator row
    pub fn keyboard(&self) -> Keyboard {
        Keyboard::new(vec![self.navigation.clone(), vec![self.indicator.clone()]])
    }
}

/// Token asking for `page` of the board behind `prefix`
pub fn page_action(prefix: &str, page: usize) -> String {
    format!("{}_{}", prefix, page)
}

/// Build the pager for `page` of `total_pages`, `None` for a single page
pub fn build_pager(page: usize, total_pages: usize, prefix: &str) -> Option<PagerSpec> {
    if total_pages <= 1 {
        return None;
    }

    let mut navigation = Vec::with_capacity(2);
    if page > 1 {
        navigation.push(ActionButton::new(PREVIOUS_LABEL, page_action(prefix, page - 1)));
    }
    if page < total_pages {
        navigation.push(ActionButton::new(NEXT_LABEL, page_action(prefix, page + 1)));
    }

    Some(PagerSpec {
        navigation,
        indicator: ActionButton::new(
            format!("Page {}/{}", page, total_pages),
            format!("{}:nop", prefix),
        ),
    })
}

/// Parse a page action token. The page is returned unclamped; rendering
/// clamps it into range.
pub fn parse_page_action(prefix: &str, token: &str) -> Option<i64> {
    token
        .strip_prefix(prefix)?
        .strip_prefix('_')?
        .parse::<i64>()
        .ok()
}
