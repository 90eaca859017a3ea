//! Rank report and user info card

use crate::delivery::{ActionButton, CardKind, Keyboard, MessageHandle};
use crate::error::{Result, SpotlightError};
use crate::leaderboard::escape_html;
use crate::metrics::MetricsCollector;
use crate::ranking::RankedUserStore;
use crate::service::reply::{EditOutcome, ReplySender};
use crate::service::ActionContext;
use crate::types::{ChatId, RankSummary, StatsWindow, UserId};
use crate::utils::{format_percent, generate_request_id};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

pub const USERINFO_ACTION_PREFIX: &str = "userinfo";
pub const USERINFO_LOADING_TEXT: &str = "🌸 Loading your stats...";
pub const USERINFO_UPDATE_FAILED_NOTICE: &str = "⚠️ Couldn't update your stats. Please try again.";

/// Overall and daily standing of one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankReport {
    pub user_id: UserId,
    pub overall: RankSummary,
    pub daily: RankSummary,
    pub text: String,
}

impl RankReport {
    pub fn new(user_id: UserId, overall: RankSummary, daily: RankSummary) -> Self {
        let text = format!(
            "\n🏆 𝐎𝐕𝐄𝐑𝐀𝐋𝐋 𝐑𝐀𝐍𝐊\n\
             Rank: {}. {}\n\
             🎮 Played: {} | Wins: {} | Losses: {} | Win %: {}\n\
             ⭐ Total Score: {} | ⛔ Penalties: {}\n\
             \n\
             📊 𝐃𝐀𝐈𝐋𝐘 𝐒𝐓𝐀𝐓𝐒\n\
             🎮 Played: {} | Wins: {} | Losses: {} | Win %: {}\n\
             ⭐ Score: {} | ⛔ Penalties: {}\n\
             \n\
             🆔 User ID: {}\n\
             ───────────────\n",
            overall.rank,
            escape_html(&overall.display_name),
            overall.games_played,
            overall.wins,
            overall.losses,
            format_percent(overall.win_percent),
            overall.total_score,
            overall.penalties,
            daily.games_played,
            daily.wins,
            daily.losses,
            format_percent(daily.win_percent),
            daily.total_score,
            daily.penalties,
            user_id
        );

        Self {
            user_id,
            overall,
            daily,
            text,
        }
    }
}

/// Token grammar `userinfo_{daily|overall}_{user_id}`
pub fn userinfo_action(window: StatsWindow, user_id: UserId) -> String {
    format!("{}_{}_{}", USERINFO_ACTION_PREFIX, window, user_id)
}

/// Parse a user info toggle. Anything other than `daily` selects the overall
/// block, matching how the buttons were always read.
pub fn parse_userinfo_action(token: &str) -> Option<(StatsWindow, UserId)> {
    let parts: Vec<&str> = token.split('_').collect();
    let [prefix, view, user_id] = parts.as_slice() else {
        return None;
    };
    if *prefix != USERINFO_ACTION_PREFIX {
        return None;
    }
    let user_id = user_id.parse::<UserId>().ok()?;
    let window = if *view == "daily" {
        StatsWindow::Daily
    } else {
        StatsWindow::Overall
    };
    Some((window, user_id))
}

/// Daily and overall toggle buttons for `user_id`
pub fn userinfo_keyboard(user_id: UserId) -> Keyboard {
    Keyboard::single_row(vec![
        ActionButton::new("📊 Daily Stats", userinfo_action(StatsWindow::Daily, user_id)),
        ActionButton::new("🏆 Overall Stats", userinfo_action(StatsWindow::Overall, user_id)),
    ])
}

/// Text and buttons of a user info card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfoCard {
    pub window: StatsWindow,
    pub summary: RankSummary,
    pub text: String,
    pub keyboard: Keyboard,
}

impl UserInfoCard {
    /// Card sent on the initial request, with the name banner
    pub fn initial(summary: RankSummary) -> Self {
        let text = format!(
            "\n╭━━━ ⟢ 𝗢𝘃𝗲𝗿𝗮𝗹𝗹 𝗦𝘁𝗮𝘁𝘀 ⟢ ━━━╮\n\
             ┃ 👤 <b>{}</b>\n\
             ╰━━━━━━━━━━━━━━━━━━━╯\n\
             🏆 𝐑𝐚𝐧𝐤: {}\n\
             🎮 Games Played: {}\n\
             🥇 Wins: {} | Losses: {}\n\
             📊 Win %: {}%\n\
             ⭐ Total Score: {}\n\
             ⛔ Penalties: {}\n\
             ━━━━━━━━━━━━━━━━━━━━━\n\
             💡 <i>One match doesn't define you, the comeback will! 🚀</i>\n",
            escape_html(&summary.display_name),
            summary.rank,
            summary.games_played,
            summary.wins,
            summary.losses,
            format_percent(summary.win_percent),
            summary.total_score,
            summary.penalties
        );
        Self::with_text(StatsWindow::Overall, summary, text)
    }

    /// Card shown after pressing one of the toggles
    pub fn toggled(window: StatsWindow, summary: RankSummary) -> Self {
        let text = match window {
            StatsWindow::Daily => format!(
                "\n╭━━━ ⟢ 𝗗𝗮𝗶𝗹𝘆 𝗦𝘁𝗮𝘁𝘀 ⟢ ━━━╮\n\
                 🏆 Daily Rank: {}\n\
                 🎮 Games: {}\n\
                 🥇 Wins: {} | Losses: {}\n\
                 📊 Win %: {}%\n\
                 ⭐ Score: {} | ⛔ Penalties: {}\n\
                 ━━━━━━━━━━━━━━━━━━━━━\n\
                 💡 Daily stats keep you motivated! 🚀\n",
                summary.rank,
                summary.games_played,
                summary.wins,
                summary.losses,
                format_percent(summary.win_percent),
                summary.total_score,
                summary.penalties
            ),
            StatsWindow::Overall => format!(
                "\n╭━━━ ⟢ 𝗢𝘃𝗲𝗿𝗮𝗹𝗹 𝗦𝘁𝗮𝘁𝘀 ⟢ ━━━╮\n\
                 🏆 Rank: {}\n\
                 🎮 Games Played: {}\n\
                 🥇 Wins: {} | Losses: {}\n\
                 📊 Win %: {}%\n\
                 ⭐ Total Score: {} | ⛔ Penalties: {}\n\
                 ━━━━━━━━━━━━━━━━━━━━━\n\
                 💡 Track your progress over time! 🚀\n",
                summary.rank,
                summary.games_played,
                summary.wins,
                summary.losses,
                format_percent(summary.win_percent),
                summary.total_score,
                summary.penalties
            ),
        };
        Self::with_text(window, summary, text)
    }

    fn with_text(window: StatsWindow, summary: RankSummary, text: String) -> Self {
        let keyboard = userinfo_keyboard(summary.user_id);
        Self {
            window,
            summary,
            text,
            keyboard,
        }
    }
}

/// Handles "show my rank" and user info triggers
#[derive(Clone)]
pub struct RankService {
    store: RankedUserStore,
    replies: ReplySender,
    metrics: Arc<MetricsCollector>,
}

impl RankService {
    pub fn new(store: RankedUserStore, replies: ReplySender) -> Self {
        let metrics = replies.metrics().clone();
        Self {
            store,
            replies,
            metrics,
        }
    }

    /// Overall and daily summaries of `target_user_id`, fetched concurrently
    pub async fn on_rank_request(&self, target_user_id: UserId) -> RankReport {
        let (overall, daily) = tokio::join!(
            self.store.fetch_overall_rank_summary(target_user_id),
            self.store.fetch_daily_rank_summary(target_user_id)
        );
        self.metrics.record_rank_report();
        RankReport::new(target_user_id, overall, daily)
    }

    /// Send the rank report of `target_user_id` to `chat_id`
    pub async fn deliver_rank(&self, chat_id: ChatId, target_user_id: UserId) -> Result<MessageHandle> {
        let span = info_span!("rank", request_id = %generate_request_id(), user_id = target_user_id);

        async move {
            let report = self.on_rank_request(target_user_id).await;
            self.replies
                .delivery()
                .send_text(chat_id, &report.text, None)
                .await
                .map_err(|e| {
                    self.metrics.record_render_fault("send_text");
                    anyhow::Error::from(SpotlightError::RenderFault {
                        message: e.to_string(),
                    })
                })
        }
        .instrument(span)
        .await
    }

    /// Overall card of `user_id`
    pub async fn on_userinfo_request(&self, user_id: UserId) -> UserInfoCard {
        UserInfoCard::initial(self.store.fetch_overall_rank_summary(user_id).await)
    }

    /// Card for a toggle token, `None` when the token does not parse
    pub async fn on_userinfo_action(&self, token: &str) -> Option<UserInfoCard> {
        let Some((window, user_id)) = parse_userinfo_action(token) else {
            debug!("Ignoring userinfo action: {}", SpotlightError::malformed(token));
            self.metrics.record_malformed_action();
            return None;
        };
        let summary = self.store.fetch_rank_summary(window, user_id).await;
        Some(UserInfoCard::toggled(window, summary))
    }

    /// Send the user info card, with the user's photo when possible
    pub async fn deliver_userinfo(&self, chat_id: ChatId, user_id: UserId) -> Result<MessageHandle> {
        let span = info_span!("userinfo", request_id = %generate_request_id(), user_id = user_id);

        async move {
            let placeholder = self
                .replies
                .send_placeholder(chat_id, USERINFO_LOADING_TEXT)
                .await;
            let card = self.on_userinfo_request(user_id).await;

            let sent = self
                .replies
                .send_with_card(chat_id, CardKind::UserInfo, user_id, &card.text, Some(&card.keyboard))
                .await;
            self.replies.remove_placeholder(placeholder).await;

            sent.map_err(|e| {
                self.metrics.record_render_fault("send_text");
                anyhow::Error::from(SpotlightError::RenderFault {
                    message: e.to_string(),
                })
            })
        }
        .instrument(span)
        .await
    }

    /// Edit the pressed card to the toggled view. Photo messages try the
    /// caption first, text messages the text; the other edit is the fallback.
    pub async fn deliver_userinfo_action(&self, action: &ActionContext) -> EditOutcome {
        let span = info_span!("userinfo_toggle", request_id = %generate_request_id());

        async move {
            let message = &action.message;
            let Some(card) = self.on_userinfo_action(&action.token).await else {
                self.replies.acknowledge(message, None).await;
                return EditOutcome::Ignored;
            };

            let delivery = self.replies.delivery();
            let keyboard = Some(&card.keyboard);
            let first = if message.is_photo() {
                delivery.edit_caption(message, &card.text, keyboard).await
            } else {
                delivery.edit_text(message, &card.text, keyboard).await
            };

            let outcome = match first {
                Ok(()) => EditOutcome::Updated,
                Err(e) if e.is_not_modified() => EditOutcome::Unchanged,
                Err(e) => {
                    warn!("Userinfo edit failed, trying the other edit: {}", e);
                    self.metrics.record_render_fault("userinfo_edit");
                    let fallback = if message.is_photo() {
                        delivery.edit_text(message, &card.text, keyboard).await
                    } else {
                        delivery.edit_caption(message, &card.text, keyboard).await
                    };
                    match fallback {
                        Ok(()) => EditOutcome::FellBack,
                        Err(e) => {
                            warn!("Userinfo fallback edit failed: {}", e);
                            self.metrics.record_render_fault("fallback");
                            EditOutcome::Failed
                        }
                    }
                }
            };

            let notice = (outcome == EditOutcome::Failed).then_some(USERINFO_UPDATE_FAILED_NOTICE);
            self.replies.acknowledge(message, notice).await;
            info!("Userinfo toggled to {} for user {}", card.window, card.summary.user_id);
            outcome
        }
        .instrument(span)
        .await
    }
}
