//! JSON shapes exchanged with the conversation API and their mapping to domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    message::{DeliveryStatus, FileInfo, Message, MessageKind, SenderRole},
    presence::PresenceState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckExistingResponse {
    pub exists: bool,
    pub chat_id: Option<i64>,
}

impl CheckExistingResponse {
    /// A positive answer without an id is treated as no session.
    pub fn into_chat_id(self) -> Option<i64> {
        self.exists.then_some(self.chat_id).flatten()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrAppendRequest<'a> {
    pub reference: &'a str,
    pub message: &'a str,
    pub sender_name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrAppendResponse {
    pub chat_id: Option<i64>,
    #[serde(default)]
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConversationResponse {
    pub messages: Vec<WireMessage>,
}

#[derive(Debug, Deserialize)]
pub struct SuccessResponse {
    #[serde(default)]
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRequest<'a> {
    pub reference: &'a str,
    pub is_online: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceResponse {
    #[serde(default)]
    pub is_online: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl From<PresenceResponse> for PresenceState {
    fn from(response: PresenceResponse) -> Self {
        Self {
            is_online: response.is_online,
            last_seen_at: response.last_seen_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AttachmentResponse {
    #[serde(default)]
    pub success: bool,
    pub message: Option<WireMessage>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireSender {
    Visitor,
    Support,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireMessageType {
    Text,
    Image,
    Video,
    File,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireStatus {
    Sent,
    Delivered,
    Read,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFileInfo {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mime_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    pub id: i64,
    pub sender_type: WireSender,
    #[serde(default = "default_message_type")]
    pub message_type: WireMessageType,
    pub content: Option<String>,
    pub file_info: Option<WireFileInfo>,
    #[serde(default = "default_status")]
    pub status: WireStatus,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
    pub sender_name: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

fn default_message_type() -> WireMessageType {
    WireMessageType::Text
}

fn default_status() -> WireStatus {
    WireStatus::Sent
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        Self {
            id: wire.id,
            sender: match wire.sender_type {
                WireSender::Visitor => SenderRole::Visitor,
                WireSender::Support => SenderRole::Support,
            },
            kind: match wire.message_type {
                WireMessageType::Text => MessageKind::Text,
                WireMessageType::Image => MessageKind::Image,
                WireMessageType::Video => MessageKind::Video,
                WireMessageType::File => MessageKind::File,
            },
            text: wire.content.filter(|content| !content.is_empty()),
            file_info: wire.file_info.map(|file| FileInfo {
                name: file.name,
                url: file.url,
                size: file.size,
                mime_type: file.mime_type,
            }),
            status: match wire.status {
                WireStatus::Sent => DeliveryStatus::Sent,
                WireStatus::Delivered => DeliveryStatus::Delivered,
                WireStatus::Read => DeliveryStatus::Read,
            },
            created_at: wire.created_at,
            delivered_at: wire.delivered_at,
            read_at: wire.read_at,
            sender_name: wire.sender_name,
            is_anonymous: wire.is_anonymous,
        }
    }
}
