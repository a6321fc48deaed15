use chrono::{DateTime, Utc};

/// Who authored a message within a support conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SenderRole {
    #[default]
    Visitor,
    Support,
}

/// Type of content carried by a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    Video,
    File,
}

impl MessageKind {
    /// Derives the message kind from an attachment MIME type.
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            Self::Image
        } else if mime_type.starts_with("video/") {
            Self::Video
        } else {
            Self::File
        }
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
            Self::File => "file",
        }
    }

    /// Returns a display label for attachment kinds, or None for plain text.
    pub fn display_label(self) -> Option<&'static str> {
        match self {
            Self::Text => None,
            Self::Image => Some("[Image]"),
            Self::Video => Some("[Video]"),
            Self::File => Some("[File]"),
        }
    }
}

/// Delivery state of a message. Ordered so that `Sent < Delivered < Read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum DeliveryStatus {
    #[default]
    Sent,
    Delivered,
    Read,
}

impl DeliveryStatus {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub url: String,
    pub size: u64,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: i64,
    pub sender: SenderRole,
    pub kind: MessageKind,
    pub text: Option<String>,
    pub file_info: Option<FileInfo>,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
    pub sender_name: Option<String>,
    pub is_anonymous: bool,
}

impl Message {
    /// True for support messages the visitor has not read yet.
    pub fn is_unread_incoming(&self) -> bool {
        self.sender == SenderRole::Support && self.read_at.is_none()
    }

    /// Folds delivery progress already known for this message into `self`.
    ///
    /// Status and timestamps only move forward: a server snapshot that reports an
    /// older status or drops a timestamp does not undo what was observed earlier.
    pub fn retain_progress_from(&mut self, previous: &Message) {
        self.status = self.status.max(previous.status);
        if self.delivered_at.is_none() {
            self.delivered_at = previous.delivered_at;
        }
        if self.read_at.is_none() {
            self.read_at = previous.read_at;
        }
    }

    /// Returns the display content: kind label + text, or the attachment name.
    pub fn display_content(&self) -> String {
        let text = self.text.as_deref().unwrap_or_default();
        let body = if text.is_empty() {
            self.file_info
                .as_ref()
                .map(|file| file.name.clone())
                .unwrap_or_default()
        } else {
            text.to_owned()
        };

        match (self.kind.display_label(), body.is_empty()) {
            (Some(label), true) => label.to_owned(),
            (Some(label), false) => format!("{label} {body}"),
            (None, _) => body,
        }
    }

    pub fn display_sender(&self) -> &str {
        if self.is_anonymous {
            return "Anonymous";
        }

        match (&self.sender_name, self.sender) {
            (Some(name), _) if !name.trim().is_empty() => name,
            (_, SenderRole::Visitor) => "You",
            (_, SenderRole::Support) => "Support",
        }
    }
}
