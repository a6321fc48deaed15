//! Use case for keeping the local message view in step with the server.
//!
//! Every sync fetches the full conversation and replaces the store wholesale.
//! Fetches are ticketed so that a slow response can never overwrite the result of
//! a fetch that started after it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{
    message::{Message, SenderRole},
    message_store::MessageStore,
    session::ChatSession,
};

/// Errors that can occur at the source level (conversation API).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationSourceError {
    Unauthorized,
    NotFound,
    Unavailable,
    InvalidData,
}

#[async_trait]
pub trait ConversationSource: Send + Sync {
    /// Fetches the whole conversation in server order.
    async fn get_conversation(&self, chat_id: i64)
        -> Result<Vec<Message>, ConversationSourceError>;

    /// Marks every support message in the conversation as read.
    async fn mark_read(&self, chat_id: i64) -> Result<(), ConversationSourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("not authorized to read the conversation")]
    Unauthorized,
    #[error("conversation not found")]
    ConversationNotFound,
    #[error("conversation service temporarily unavailable")]
    TemporarilyUnavailable,
    #[error("conversation payload violated the data contract")]
    DataContractViolation,
}

/// Monotonic ticket handed out before a fetch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub message_count: usize,
    pub unread: usize,
    pub newest_unread: Option<i64>,
    /// Id of the newest message when it is a freshly arrived support message.
    pub new_incoming: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageSynchronizer {
    issued: u64,
    applied: u64,
}

impl MessageSynchronizer {
    pub fn begin(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    /// Applies a fetched snapshot, unless a newer fetch has already been applied.
    pub fn apply(
        &mut self,
        ticket: FetchTicket,
        session: &mut ChatSession,
        store: &mut MessageStore,
        fetched: Vec<Message>,
        now: DateTime<Utc>,
    ) -> Option<SyncReport> {
        if ticket.0 <= self.applied {
            tracing::debug!(
                code = "CHAT_SYNC_STALE_RESPONSE_DROPPED",
                ticket = ticket.0,
                applied = self.applied,
                "dropping conversation snapshot older than the one on screen"
            );
            return None;
        }
        self.applied = ticket.0;

        let prior_count = session.last_known_message_count;
        let summary = store.replace_all(fetched);
        session.record_sync(summary.current_count, now);

        if summary.dropped_duplicates > 0 {
            tracing::warn!(
                code = "CHAT_SYNC_DUPLICATE_IDS",
                chat_id = session.id,
                dropped = summary.dropped_duplicates,
                "conversation snapshot contained duplicate message ids"
            );
        }

        let new_incoming = (summary.current_count > prior_count
            && prior_count > 0
            && summary.newest_sender == Some(SenderRole::Support))
        .then(|| store.newest().map(|message| message.id))
        .flatten();

        Some(SyncReport {
            message_count: summary.current_count,
            unread: store.unread_count(),
            newest_unread: store.newest_unread_id(),
            new_incoming,
        })
    }

    /// Forgets applied tickets so a new session starts from a clean slate.
    pub fn reset(&mut self) {
        self.applied = self.issued;
    }
}

/// Fetches the full conversation. Apply the result with a ticket taken from
/// `MessageSynchronizer::begin` before the call started.
pub async fn fetch_conversation(
    source: &dyn ConversationSource,
    chat_id: i64,
) -> Result<Vec<Message>, SyncError> {
    source
        .get_conversation(chat_id)
        .await
        .map_err(map_source_error)
}

/// Marks the conversation read on the server. The caller updates its store once
/// this succeeds.
pub async fn mark_conversation_read(
    source: &dyn ConversationSource,
    chat_id: i64,
) -> Result<(), SyncError> {
    source.mark_read(chat_id).await.map_err(map_source_error)
}

fn map_source_error(error: ConversationSourceError) -> SyncError {
    match error {
        ConversationSourceError::Unauthorized => SyncError::Unauthorized,
        ConversationSourceError::NotFound => SyncError::ConversationNotFound,
        ConversationSourceError::Unavailable => SyncError::TemporarilyUnavailable,
        ConversationSourceError::InvalidData => SyncError::DataContractViolation,
    }
}
