//! Use case for sending a text message and for finding an existing conversation.
//!
//! The first message sent for a reference creates the server conversation; later
//! messages are appended to it.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::session::ChatSession;

/// Command to send a message under a tracking reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageCommand {
    pub reference: String,
    pub text: String,
    pub sender_name: String,
}

/// Errors that can occur at the source level (conversation API).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendMessageSourceError {
    /// Caller is not allowed to post under this reference.
    Unauthorized,
    /// Server answered but refused to persist the message.
    Rejected(String),
    /// Service is temporarily unavailable.
    Unavailable,
    /// Response did not match the expected shape.
    InvalidData,
}

/// Domain-level errors for the send message operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// Message text is empty after trimming whitespace.
    #[error("message is empty")]
    EmptyMessage,
    #[error("not authorized to send messages")]
    Unauthorized,
    #[error("message was rejected: {0}")]
    Rejected(String),
    #[error("chat service temporarily unavailable")]
    TemporarilyUnavailable,
}

impl SendMessageError {
    /// Validation failures are shown inline and never reached the network.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyMessage)
    }
}

#[async_trait]
pub trait ConversationStarter: Send + Sync {
    /// Looks up the conversation bound to `reference`, if one exists.
    async fn check_existing(&self, reference: &str)
        -> Result<Option<i64>, SendMessageSourceError>;

    /// Creates the conversation or appends to it, returning its id.
    async fn create_or_append(
        &self,
        reference: &str,
        text: &str,
        sender_name: &str,
    ) -> Result<i64, SendMessageSourceError>;
}

/// Sends a message, returning the session it now belongs to.
///
/// Validates the text (must not be empty after trimming) before any network call.
pub async fn send_message(
    starter: &dyn ConversationStarter,
    command: SendMessageCommand,
) -> Result<ChatSession, SendMessageError> {
    let text = command.text.trim();
    if text.is_empty() {
        return Err(SendMessageError::EmptyMessage);
    }

    let chat_id = starter
        .create_or_append(&command.reference, text, &command.sender_name)
        .await
        .map_err(map_source_error)?;

    Ok(ChatSession::new(chat_id, command.reference))
}

/// Finds the session already bound to `reference`.
pub async fn find_existing_session(
    starter: &dyn ConversationStarter,
    reference: &str,
) -> Result<Option<ChatSession>, SendMessageError> {
    let chat_id = starter
        .check_existing(reference)
        .await
        .map_err(map_source_error)?;

    Ok(chat_id.map(|id| ChatSession::new(id, reference)))
}

fn map_source_error(error: SendMessageSourceError) -> SendMessageError {
    match error {
        SendMessageSourceError::Unauthorized => SendMessageError::Unauthorized,
        SendMessageSourceError::Rejected(reason) => SendMessageError::Rejected(reason),
        SendMessageSourceError::Unavailable | SendMessageSourceError::InvalidData => {
            SendMessageError::TemporarilyUnavailable
        }
    }
}
