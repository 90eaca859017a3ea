//! Delivery collaborator interface
//!
//! The chat transport is external. The spotlight hands it finished texts and
//! keyboards through [`Delivery`] and gets back handles for later edits.

pub mod cards;
pub mod console;
pub mod keyboard;

pub use cards::{AvatarSource, CardKind, CardRenderer};
pub use console::ConsoleDelivery;
pub use keyboard::{ActionButton, Keyboard};

use crate::types::ChatId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of a delivery operation
pub type DeliveryResult<T> = std::result::Result<T, DeliveryError>;

/// Failures reported by the chat transport
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The edit would not change the message
    #[error("Message is not modified: {message}")]
    NotModified { message: String },

    #[error("Delivery rejected: {message}")]
    Rejected { message: String },

    #[error("Delivery unavailable: {message}")]
    Unavailable { message: String },
}

impl DeliveryError {
    /// Classify a raw transport error message
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.to_lowercase().contains("not modified") {
            Self::NotModified { message }
        } else {
            Self::Rejected { message }
        }
    }

    pub fn is_not_modified(&self) -> bool {
        matches!(self, Self::NotModified { .. })
    }
}

/// Whether a message carries a photo (edited via its caption) or plain text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Photo,
}

/// Reference to a delivered message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHandle {
    pub chat_id: ChatId,
    pub message_id: i64,
    pub kind: MessageKind,
}

impl MessageHandle {
    pub fn new(chat_id: ChatId, message_id: i64, kind: MessageKind) -> Self {
        Self {
            chat_id,
            message_id,
            kind,
        }
    }

    pub fn is_photo(&self) -> bool {
        self.kind == MessageKind::Photo
    }
}

/// Trait for sending and editing chat messages
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Send an HTML text message
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> DeliveryResult<MessageHandle>;

    /// Send a photo with an HTML caption
    async fn send_photo(
        &self,
        chat_id: ChatId,
        photo: &[u8],
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> DeliveryResult<MessageHandle>;

    /// Replace the caption of a photo message
    async fn edit_caption(
        &self,
        message: &MessageHandle,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> DeliveryResult<()>;

    /// Replace the text of a text message
    async fn edit_text(
        &self,
        message: &MessageHandle,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> DeliveryResult<()>;

    async fn delete(&self, message: &MessageHandle) -> DeliveryResult<()>;

    /// Answer the button press that targeted `message`, optionally with a
    /// short notice
    async fn acknowledge(&self, message: &MessageHandle, notice: Option<&str>)
        -> DeliveryResult<()>;
}
