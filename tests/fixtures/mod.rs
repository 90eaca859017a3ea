//! Test fixtures and fake collaborators for integration testing

#![allow(dead_code)]

use async_trait::async_trait;
use mockall::mock;
use player_spotlight::config::AppConfig;
use player_spotlight::delivery::{
    AvatarSource, CardKind, CardRenderer, Delivery, DeliveryError, DeliveryResult, Keyboard,
    MessageHandle, MessageKind,
};
use player_spotlight::service::{AppState, CardCollaborators};
use player_spotlight::storage::InMemoryStatsSource;
use player_spotlight::types::{ChatId, UserId, UserStatRecord};
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

/// One call made against the delivery collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryCall {
    SendText {
        chat_id: ChatId,
        text: String,
        keyboard: Option<Keyboard>,
    },
    SendPhoto {
        chat_id: ChatId,
        bytes: usize,
        caption: String,
        keyboard: Option<Keyboard>,
    },
    EditCaption {
        message_id: i64,
        caption: String,
        keyboard: Option<Keyboard>,
    },
    EditText {
        message_id: i64,
        text: String,
        keyboard: Option<Keyboard>,
    },
    Delete {
        message_id: i64,
    },
    Acknowledge {
        message_id: i64,
        notice: Option<String>,
    },
}

/// Delivery operations that can be scripted to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SendText,
    SendPhoto,
    EditCaption,
    EditText,
    Delete,
    Acknowledge,
}

/// Delivery fake that records every call and fails on request
#[derive(Debug, Default)]
pub struct RecordingDelivery {
    calls: Arc<Mutex<Vec<DeliveryCall>>>,
    failures: Mutex<HashMap<Operation, VecDeque<DeliveryError>>>,
    next_message_id: AtomicI64,
}

impl RecordingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `operation` fail with `error`
    pub fn fail_next(&self, operation: Operation, error: DeliveryError) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.entry(operation).or_default().push_back(error);
        }
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<DeliveryCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    /// Notices passed to acknowledgements, in order
    pub fn acknowledgements(&self) -> Vec<Option<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DeliveryCall::Acknowledge { notice, .. } => Some(notice),
                _ => None,
            })
            .collect()
    }

    /// Texts sent as new text messages, in order
    pub fn sent_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DeliveryCall::SendText { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: DeliveryCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn scripted_failure(&self, operation: Operation) -> DeliveryResult<()> {
        let failure = self
            .failures
            .lock()
            .ok()
            .and_then(|mut failures| failures.get_mut(&operation).and_then(VecDeque::pop_front));
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn allocate(&self, chat_id: ChatId, kind: MessageKind) -> MessageHandle {
        let id = self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1;
        MessageHandle::new(chat_id, id, kind)
    }
}

#[async_trait]
impl Delivery for RecordingDelivery {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> DeliveryResult<MessageHandle> {
        self.record(DeliveryCall::SendText {
            chat_id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        self.scripted_failure(Operation::SendText)?;
        Ok(self.allocate(chat_id, MessageKind::Text))
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        photo: &[u8],
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> DeliveryResult<MessageHandle> {
        self.record(DeliveryCall::SendPhoto {
            chat_id,
            bytes: photo.len(),
            caption: caption.to_string(),
            keyboard: keyboard.cloned(),
        });
        self.scripted_failure(Operation::SendPhoto)?;
        Ok(self.allocate(chat_id, MessageKind::Photo))
    }

    async fn edit_caption(
        &self,
        message: &MessageHandle,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> DeliveryResult<()> {
        self.record(DeliveryCall::EditCaption {
            message_id: message.message_id,
            caption: caption.to_string(),
            keyboard: keyboard.cloned(),
        });
        self.scripted_failure(Operation::EditCaption)
    }

    async fn edit_text(
        &self,
        message: &MessageHandle,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> DeliveryResult<()> {
        self.record(DeliveryCall::EditText {
            message_id: message.message_id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        self.scripted_failure(Operation::EditText)
    }

    async fn delete(&self, message: &MessageHandle) -> DeliveryResult<()> {
        self.record(DeliveryCall::Delete {
            message_id: message.message_id,
        });
        self.scripted_failure(Operation::Delete)
    }

    async fn acknowledge(
        &self,
        message: &MessageHandle,
        notice: Option<&str>,
    ) -> DeliveryResult<()> {
        self.record(DeliveryCall::Acknowledge {
            message_id: message.message_id,
            notice: notice.map(str::to_string),
        });
        self.scripted_failure(Operation::Acknowledge)
    }
}

/// Create a player record with the given wins and score
pub fn create_player(user_id: UserId, wins: u64, total_score: u64) -> UserStatRecord {
    UserStatRecord {
        user_id,
        first_name: Some(format!("Player{}", user_id)),
        games_played: wins * 2,
        wins,
        losses: wins,
        total_score,
        ..Default::default()
    }
}

/// Seven players ranked 1..=7 by id
pub fn create_seven_players() -> Vec<UserStatRecord> {
    (1..=7).map(|id| create_player(id, 20 - id as u64, 0)).collect()
}

/// Complete system over an in-memory source and a recording delivery
pub struct TestSystem {
    pub app: AppState,
    pub source: Arc<InMemoryStatsSource>,
    pub delivery: Arc<RecordingDelivery>,
}

pub fn create_test_system(
    overall: Vec<UserStatRecord>,
    daily: Vec<UserStatRecord>,
    cards: Option<CardCollaborators>,
) -> TestSystem {
    let source = Arc::new(InMemoryStatsSource::with_users(overall, daily));
    let delivery = Arc::new(RecordingDelivery::new());
    let app = AppState::new(AppConfig::default(), source.clone(), delivery.clone(), cards)
        .expect("Failed to create test system");

    TestSystem {
        app,
        source,
        delivery,
    }
}

/// Handle of a message the bot sent earlier
pub fn sent_message(kind: MessageKind) -> MessageHandle {
    MessageHandle::new(-500, 77, kind)
}

mock! {
    pub Cards {}

    #[async_trait]
    impl CardRenderer for Cards {
        async fn render_card(&self, kind: CardKind, avatar: Option<PathBuf>) -> anyhow::Result<Vec<u8>>;
    }
}

mock! {
    pub Avatars {}

    #[async_trait]
    impl AvatarSource for Avatars {
        async fn fetch_avatar(&self, user_id: UserId) -> anyhow::Result<Option<PathBuf>>;
    }
}

/// Card collaborators from configured mocks
pub fn card_collaborators(cards: MockCards, avatars: MockAvatars) -> CardCollaborators {
    CardCollaborators::new(Arc::new(cards), Arc::new(avatars))
}
