//! Console delivery used by the CLI

use crate::delivery::{Delivery, DeliveryResult, Keyboard, MessageHandle, MessageKind};
use crate::leaderboard::loading_text;
use crate::service::rank::USERINFO_LOADING_TEXT;
use crate::types::{ChatId, StatsWindow};
use async_trait::async_trait;
use std::io::Write;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;

/// Prints every message to stdout
#[derive(Debug, Default)]
pub struct ConsoleDelivery {
    next_message_id: AtomicI64,
    /// Suppress placeholders and acknowledgements
    quiet: bool,
}

impl ConsoleDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only print final replies
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::default()
        }
    }

    fn is_placeholder(text: &str) -> bool {
        text == loading_text(StatsWindow::Overall)
            || text == loading_text(StatsWindow::Daily)
            || text == USERINFO_LOADING_TEXT
    }

    fn allocate(&self, chat_id: ChatId, kind: MessageKind) -> MessageHandle {
        let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1;
        MessageHandle::new(chat_id, message_id, kind)
    }

    fn print(&self, header: &str, body: &str, keyboard: Option<&Keyboard>) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let _ = writeln!(out, "── {} ──", header);
        let _ = writeln!(out, "{}", body.trim_end());
        if let Some(keyboard) = keyboard {
            for row in &keyboard.rows {
                let buttons: Vec<String> = row
                    .iter()
                    .map(|b| format!("[{} → {}]", b.label, b.action))
                    .collect();
                let _ = writeln!(out, "{}", buttons.join(" "));
            }
        }
        let _ = writeln!(out);
    }
}

#[async_trait]
impl Delivery for ConsoleDelivery {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> DeliveryResult<MessageHandle> {
        let handle = self.allocate(chat_id, MessageKind::Text);
        if !(self.quiet && Self::is_placeholder(text)) {
            self.print(&format!("message #{}", handle.message_id), text, keyboard);
        }
        Ok(handle)
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        photo: &[u8],
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> DeliveryResult<MessageHandle> {
        let handle = self.allocate(chat_id, MessageKind::Photo);
        self.print(
            &format!("photo #{} ({} bytes)", handle.message_id, photo.len()),
            caption,
            keyboard,
        );
        Ok(handle)
    }

    async fn edit_caption(
        &self,
        message: &MessageHandle,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> DeliveryResult<()> {
        self.print(&format!("caption of #{}", message.message_id), caption, keyboard);
        Ok(())
    }

    async fn edit_text(
        &self,
        message: &MessageHandle,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> DeliveryResult<()> {
        self.print(&format!("edit of #{}", message.message_id), text, keyboard);
        Ok(())
    }

    async fn delete(&self, message: &MessageHandle) -> DeliveryResult<()> {
        debug!("Deleted message #{}", message.message_id);
        Ok(())
    }

    async fn acknowledge(
        &self,
        message: &MessageHandle,
        notice: Option<&str>,
    ) -> DeliveryResult<()> {
        if let Some(notice) = notice {
            if !self.quiet {
                self.print(&format!("notice on #{}", message.message_id), notice, None);
            }
        }
        Ok(())
    }
}
