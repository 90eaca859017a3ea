//! Shared delivery flows: loading placeholders and card-or-text replies

use crate::delivery::{
    AvatarSource, CardKind, CardRenderer, Delivery, DeliveryResult, Keyboard, MessageHandle,
};
use crate::metrics::MetricsCollector;
use crate::types::{ChatId, UserId};
use std::sync::Arc;
use tracing::{debug, warn};

/// Card renderer and the avatar source it draws from
#[derive(Clone)]
pub struct CardCollaborators {
    pub renderer: Arc<dyn CardRenderer>,
    pub avatars: Arc<dyn AvatarSource>,
}

impl CardCollaborators {
    pub fn new(renderer: Arc<dyn CardRenderer>, avatars: Arc<dyn AvatarSource>) -> Self {
        Self { renderer, avatars }
    }
}

/// How an edit in response to a button press ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The message now shows the new content
    Updated,
    /// The transport reported the content as unchanged
    Unchanged,
    /// The first edit failed and the fallback edit went through
    FellBack,
    /// Both edits failed; the press was answered with an apology
    Failed,
    /// The action token did not parse
    Ignored,
}

/// Sends replies, decorating them with a card when possible
#[derive(Clone)]
pub struct ReplySender {
    delivery: Arc<dyn Delivery>,
    cards: Option<CardCollaborators>,
    metrics: Arc<MetricsCollector>,
}

impl ReplySender {
    pub fn new(
        delivery: Arc<dyn Delivery>,
        cards: Option<CardCollaborators>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            delivery,
            cards,
            metrics,
        }
    }

    pub fn delivery(&self) -> &Arc<dyn Delivery> {
        &self.delivery
    }

    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    /// Send a placeholder; failures are only logged
    pub async fn send_placeholder(&self, chat_id: ChatId, text: &str) -> Option<MessageHandle> {
        match self.delivery.send_text(chat_id, text, None).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                debug!("Could not send loading placeholder: {}", e);
                None
            }
        }
    }

    /// Delete a placeholder if one was sent; failures are only logged
    pub async fn remove_placeholder(&self, placeholder: Option<MessageHandle>) {
        if let Some(handle) = placeholder {
            if let Err(e) = self.delivery.delete(&handle).await {
                debug!("Could not delete loading placeholder: {}", e);
            }
        }
    }

    /// Draw the card of `kind` around `avatar_user`'s photo
    async fn render_card(&self, kind: CardKind, avatar_user: UserId) -> Option<Vec<u8>> {
        let cards = self.cards.as_ref()?;

        let avatar = match cards.avatars.fetch_avatar(avatar_user).await {
            Ok(avatar) => avatar,
            Err(e) => {
                warn!(
                    "Failed to download photo of user {}; using default card background: {}",
                    avatar_user, e
                );
                None
            }
        };

        match cards.renderer.render_card(kind, avatar).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Failed to render {} card: {}", kind, e);
                self.metrics.record_render_fault("card");
                None
            }
        }
    }

    /// Send `text` as a photo caption when a card can be drawn, otherwise
    /// (or when the photo is refused) as a text message
    pub async fn send_with_card(
        &self,
        chat_id: ChatId,
        kind: CardKind,
        avatar_user: UserId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> DeliveryResult<MessageHandle> {
        if let Some(card) = self.render_card(kind, avatar_user).await {
            match self.delivery.send_photo(chat_id, &card, text, keyboard).await {
                Ok(handle) => return Ok(handle),
                Err(e) => {
                    warn!("Failed to send {} card, sending text instead: {}", kind, e);
                    self.metrics.record_render_fault("send_photo");
                }
            }
        }

        self.delivery.send_text(chat_id, text, keyboard).await
    }

    /// Answer a button press, logging failures
    pub async fn acknowledge(&self, message: &MessageHandle, notice: Option<&str>) {
        if let Err(e) = self.delivery.acknowledge(message, notice).await {
            debug!("Could not acknowledge action: {}", e);
        }
    }
}
