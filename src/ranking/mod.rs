//! Rank computation
//!
//! Orderings are rebuilt from the source on every query and never cached.

pub mod ordering;
pub mod store;

pub use ordering::{compare_by_rank, rank_order, RankedOrdering};
pub use store::{RankedUserStore, DEFAULT_FETCH_LIMIT};
