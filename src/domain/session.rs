use chrono::{DateTime, Utc};

/// Client-side handle on the server conversation bound to one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    pub id: i64,
    pub reference: String,
    pub last_known_message_count: usize,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl ChatSession {
    pub fn new(id: i64, reference: impl Into<String>) -> Self {
        Self {
            id,
            reference: reference.into(),
            last_known_message_count: 0,
            last_synced_at: None,
        }
    }

    pub fn record_sync(&mut self, message_count: usize, at: DateTime<Utc>) {
        self.last_known_message_count = message_count;
        self.last_synced_at = Some(at);
    }
}
