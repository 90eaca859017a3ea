//! Aggregate stats overview and category pages

use crate::delivery::MessageHandle;
use crate::error::{Result, SpotlightError};
use crate::metrics::MetricsCollector;
use crate::service::reply::ReplySender;
use crate::service::ActionContext;
use crate::stats::{overview_text, stats_keyboard, AggregateSnapshot, StatsCategory, StatsSessions};
use crate::storage::StatsSource;
use crate::types::ChatId;
use crate::utils::{current_timestamp, generate_request_id};
use std::sync::Arc;
use tracing::{debug, error, info_span, Instrument};

pub const ALREADY_VIEWING_TEXT: &str = "ℹ️ You're already viewing this stats category.";
pub const OVERVIEW_FAILED_TEXT: &str = "❌ Critical error fetching stats. Please try again later.";
pub const CATEGORY_FAILED_TEXT: &str = "❌ Critical error fetching stats. Try again later.";
pub const UPDATE_FAILED_TEXT: &str = "❌ Error updating stats. Try again later.";

/// How a category button press was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsActionOutcome {
    /// The message now shows the category
    Selected(StatsCategory),
    /// The category was already on screen
    AlreadyViewing,
    /// The aggregates or the edit failed
    Failed,
    /// Not a stats category token
    Ignored,
}

/// Handles the stats overview and its category buttons
#[derive(Clone)]
pub struct StatsService {
    source: Arc<dyn StatsSource>,
    sessions: Arc<StatsSessions>,
    replies: ReplySender,
    metrics: Arc<MetricsCollector>,
}

impl StatsService {
    pub fn new(source: Arc<dyn StatsSource>, sessions: Arc<StatsSessions>, replies: ReplySender) -> Self {
        let metrics = replies.metrics().clone();
        Self {
            source,
            sessions,
            replies,
            metrics,
        }
    }

    pub fn sessions(&self) -> Arc<StatsSessions> {
        self.sessions.clone()
    }

    async fn snapshot(&self) -> Result<AggregateSnapshot> {
        let timer = self.metrics.start_timer();
        let result = self.source.aggregates(current_timestamp()).await;
        self.metrics.record_fetch("aggregates", result.is_ok(), timer.stop());
        result
    }

    /// Detail text of `category` from a fresh snapshot
    pub async fn category_text(&self, category: StatsCategory) -> Result<String> {
        Ok(category.render(&self.snapshot().await?))
    }

    /// Send the overview with the category buttons and reset the chat's
    /// current category
    pub async fn on_stats_request(&self, chat_id: ChatId) -> Result<MessageHandle> {
        let span = info_span!("stats", request_id = %generate_request_id(), chat_id = chat_id);

        async move {
            let delivery = self.replies.delivery();
            let sent = match self.snapshot().await {
                Ok(snapshot) => {
                    let keyboard = stats_keyboard();
                    let sent = delivery
                        .send_text(chat_id, &overview_text(&snapshot), Some(&keyboard))
                        .await;
                    self.sessions.reset(chat_id).await;
                    self.metrics.record_stats_view("overview");
                    sent
                }
                Err(e) => {
                    error!("Critical error in stats command: {}", e);
                    delivery.send_text(chat_id, OVERVIEW_FAILED_TEXT, None).await
                }
            };

            sent.map_err(|e| {
                anyhow::Error::from(SpotlightError::RenderFault {
                    message: e.to_string(),
                })
            })
        }
        .instrument(span)
        .await
    }

    /// Switch the pressed overview message to the selected category
    pub async fn on_stats_action(&self, action: &ActionContext) -> StatsActionOutcome {
        let span = info_span!("stats_category", request_id = %generate_request_id(), token = %action.token);

        async move {
            let message = &action.message;
            let chat_id = message.chat_id;
            self.replies.acknowledge(message, None).await;

            let Some(category) = StatsCategory::from_action(&action.token) else {
                debug!("Ignoring stats action: {}", SpotlightError::malformed(&action.token));
                self.metrics.record_malformed_action();
                return StatsActionOutcome::Ignored;
            };

            if self.sessions.current(chat_id).await == Some(category) {
                self.notify(chat_id, ALREADY_VIEWING_TEXT).await;
                return StatsActionOutcome::AlreadyViewing;
            }

            let text = match self.category_text(category).await {
                Ok(text) => text,
                Err(e) => {
                    error!("Critical error in stats callback: {}", e);
                    self.notify(chat_id, CATEGORY_FAILED_TEXT).await;
                    return StatsActionOutcome::Failed;
                }
            };

            let keyboard = stats_keyboard();
            match self
                .replies
                .delivery()
                .edit_text(message, &text, Some(&keyboard))
                .await
            {
                Ok(()) => {
                    self.sessions.set(chat_id, category).await;
                    self.metrics.record_stats_view(category.as_str());
                    debug!("Displayed stats category: {}", category);
                    StatsActionOutcome::Selected(category)
                }
                Err(e) if e.is_not_modified() => {
                    debug!("Message not modified for category {}", category);
                    self.notify(chat_id, ALREADY_VIEWING_TEXT).await;
                    StatsActionOutcome::AlreadyViewing
                }
                Err(e) => {
                    error!("Failed to show stats category {}: {}", category, e);
                    self.metrics.record_render_fault("stats_edit");
                    self.notify(chat_id, UPDATE_FAILED_TEXT).await;
                    StatsActionOutcome::Failed
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn notify(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.replies.delivery().send_text(chat_id, text, None).await {
            debug!("Couldn't send stats notice: {}", e);
        }
    }
}
