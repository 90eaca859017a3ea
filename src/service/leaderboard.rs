//! Leaderboard triggers: the initial board and page changes

use crate::delivery::{CardKind, MessageHandle};
use crate::error::{Result, SpotlightError};
use crate::leaderboard::{
    action_prefix, build_pager, loading_text, parse_page_action, render_page_with_viewer,
    PagerSpec, RenderedPage,
};
use crate::metrics::MetricsCollector;
use crate::ranking::{RankedOrdering, RankedUserStore};
use crate::service::reply::{EditOutcome, ReplySender};
use crate::service::ActionContext;
use crate::types::{ChatId, StatsWindow, UserId};
use crate::utils::generate_request_id;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Shown once an edit fails and the plain-text fallback is used
pub const FALLBACK_NOTICE: &str = "⚠️ Failed to update caption, showing text instead.";
pub const NO_CHANGES_NOTICE: &str = "No changes.";
pub const UPDATE_FAILED_NOTICE: &str = "⚠️ Couldn't update the leaderboard. Please try again.";

/// A leaderboard page ready to be delivered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardReply {
    pub window: StatsWindow,
    pub text: String,
    pub page: usize,
    pub total_pages: usize,
    pub pager: Option<PagerSpec>,
    /// Rank 1 of the ordering the page was built from
    #[serde(skip)]
    pub leader: Option<UserId>,
}

impl LeaderboardReply {
    fn from_rendered(window: StatsWindow, rendered: RenderedPage, leader: Option<UserId>) -> Self {
        let pager = build_pager(rendered.page, rendered.total_pages, action_prefix(window));
        Self {
            window,
            text: rendered.text,
            page: rendered.page,
            total_pages: rendered.total_pages,
            pager,
            leader,
        }
    }
}

fn card_kind(window: StatsWindow) -> CardKind {
    match window {
        StatsWindow::Overall => CardKind::Leaderboard,
        StatsWindow::Daily => CardKind::DailyLeaderboard,
    }
}

/// Handles overall and daily leaderboard triggers
#[derive(Clone)]
pub struct LeaderboardService {
    store: RankedUserStore,
    replies: ReplySender,
    metrics: Arc<MetricsCollector>,
    per_page: usize,
}

impl LeaderboardService {
    pub fn new(store: RankedUserStore, replies: ReplySender, per_page: usize) -> Self {
        let metrics = replies.metrics().clone();
        Self {
            store,
            replies,
            metrics,
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    async fn build_reply(&self, window: StatsWindow, page: i64, viewer_id: UserId) -> LeaderboardReply {
        let fetch_limit = self.store.fetch_limit();
        let ordering: RankedOrdering = self.store.fetch_ordered(window, fetch_limit).await;

        // A full fetch may have cut the viewer off, so rank them against the
        // whole table. A degraded summary (0 users) keeps the local lookup.
        let viewer = if ordering.len() >= fetch_limit && ordering.rank_of(viewer_id).is_none() {
            let summary = self.store.fetch_rank_summary(window, viewer_id).await;
            (summary.total_users > 0).then_some(summary)
        } else {
            None
        };

        let timer = self.metrics.start_timer();
        let rendered = render_page_with_viewer(&ordering, page, self.per_page, viewer_id, viewer);
        self.metrics.record_page_rendered(window, timer.stop());

        let leader = ordering.at_rank(1).map(|r| r.user_id);
        LeaderboardReply::from_rendered(window, rendered, leader)
    }

    /// First page of the board for `viewer_id`
    pub async fn on_initial_request(&self, window: StatsWindow, viewer_id: UserId) -> LeaderboardReply {
        self.build_reply(window, 1, viewer_id).await
    }

    /// Page named by `token`, or `None` when the token is not a page action
    /// of this board
    pub async fn on_page_action(
        &self,
        window: StatsWindow,
        viewer_id: UserId,
        token: &str,
    ) -> Option<LeaderboardReply> {
        let page = match parse_page_action(action_prefix(window), token) {
            Some(page) => page,
            None => {
                debug!("Ignoring {} action: {}", window, SpotlightError::malformed(token));
                self.metrics.record_malformed_action();
                return None;
            }
        };

        Some(self.build_reply(window, page, viewer_id).await)
    }

    /// Send the first page to `chat_id`, decorated with the leader's card
    pub async fn deliver_initial(
        &self,
        window: StatsWindow,
        chat_id: ChatId,
        viewer_id: UserId,
    ) -> Result<MessageHandle> {
        let span = info_span!("leaderboard", request_id = %generate_request_id(), board = %window);

        async move {
            let placeholder = self.replies.send_placeholder(chat_id, loading_text(window)).await;

            let reply = self.on_initial_request(window, viewer_id).await;
            let keyboard = reply.pager.as_ref().map(PagerSpec::keyboard);
            let avatar_user = reply.leader.unwrap_or(viewer_id);

            let sent = self
                .replies
                .send_with_card(
                    chat_id,
                    card_kind(window),
                    avatar_user,
                    &reply.text,
                    keyboard.as_ref(),
                )
                .await;

            self.replies.remove_placeholder(placeholder).await;

            match sent {
                Ok(handle) => {
                    info!(
                        "Sent {} leaderboard page {}/{} to chat {}",
                        window, reply.page, reply.total_pages, chat_id
                    );
                    Ok(handle)
                }
                Err(e) => {
                    error!("Failed to send {} leaderboard: {}", window, e);
                    self.metrics.record_render_fault("send_text");
                    Err(anyhow::Error::from(SpotlightError::RenderFault {
                        message: e.to_string(),
                    }))
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Edit the pressed message to show the requested page
    pub async fn deliver_page_action(&self, window: StatsWindow, action: &ActionContext) -> EditOutcome {
        let span = info_span!("leaderboard_page", request_id = %generate_request_id(), board = %window);

        async move {
            let reply = match self
                .on_page_action(window, action.viewer_id, &action.token)
                .await
            {
                Some(reply) => reply,
                None => {
                    self.replies.acknowledge(&action.message, None).await;
                    return EditOutcome::Ignored;
                }
            };

            let delivery = self.replies.delivery();
            let keyboard = reply.pager.as_ref().map(PagerSpec::keyboard);
            let message = &action.message;

            let edited = if message.is_photo() {
                delivery
                    .edit_caption(message, &reply.text, keyboard.as_ref())
                    .await
            } else {
                delivery.edit_text(message, &reply.text, keyboard.as_ref()).await
            };

            match edited {
                Ok(()) => {
                    self.replies.acknowledge(message, None).await;
                    debug!("Showing {} page {}/{}", window, reply.page, reply.total_pages);
                    EditOutcome::Updated
                }
                Err(e) if e.is_not_modified() => {
                    self.replies.acknowledge(message, Some(NO_CHANGES_NOTICE)).await;
                    EditOutcome::Unchanged
                }
                Err(e) => {
                    warn!("Failed to edit {} leaderboard, falling back to text: {}", window, e);
                    self.metrics.record_render_fault(if message.is_photo() {
                        "edit_caption"
                    } else {
                        "edit_text"
                    });

                    let fallback = format!("{}\n\n{}", FALLBACK_NOTICE, reply.text);
                    match delivery.edit_text(message, &fallback, keyboard.as_ref()).await {
                        Ok(()) => {
                            self.replies.acknowledge(message, None).await;
                            EditOutcome::FellBack
                        }
                        Err(e) => {
                            error!("Fallback also failed for {} leaderboard update: {}", window, e);
                            self.metrics.record_render_fault("fallback");
                            self.replies
                                .acknowledge(message, Some(UPDATE_FAILED_NOTICE))
                                .await;
                            EditOutcome::Failed
                        }
                    }
                }
            }
        }
        .instrument(span)
        .await
    }
}
