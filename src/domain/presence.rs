use chrono::{DateTime, Utc};

/// Last known online state of the support counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresenceState {
    pub is_online: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl PresenceState {
    pub fn as_label(&self) -> &'static str {
        if self.is_online {
            "online"
        } else {
            "offline"
        }
    }
}
