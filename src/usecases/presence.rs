//! Visitor heartbeats and counterpart presence polling.
//!
//! Online beats repeat while the widget is open; going offline is reported once.

use async_trait::async_trait;

use crate::domain::presence::PresenceState;

const PRESENCE_REPORT_FAILED: &str = "CHAT_PRESENCE_REPORT_FAILED";
const PRESENCE_POLL_FAILED: &str = "CHAT_PRESENCE_POLL_FAILED";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceSourceError {
    Unauthorized,
    NotFound,
    Unavailable,
    InvalidData,
}

#[async_trait]
pub trait PresenceBackend: Send + Sync {
    async fn set_presence(
        &self,
        chat_id: i64,
        reference: &str,
        is_online: bool,
    ) -> Result<(), PresenceSourceError>;

    async fn get_presence(&self, chat_id: i64) -> Result<PresenceState, PresenceSourceError>;
}

/// Tracks whether an offline report is owed and what support looked like last.
///
/// Holds no backend; the widget makes the calls and hands their results back here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresenceHeartbeat {
    counterpart: PresenceState,
    active: bool,
}

impl PresenceHeartbeat {
    pub fn counterpart(&self) -> PresenceState {
        self.counterpart
    }

    /// Called as an online beat goes out. A failed beat still owes the offline report.
    pub fn start_beat(&mut self) {
        self.active = true;
    }

    /// Whether a single offline report should go out now. True at most once per run
    /// of beats.
    pub fn take_offline_report(&mut self) -> bool {
        std::mem::take(&mut self.active)
    }

    /// Logs a failed report; the next beat retries.
    pub fn record_report(
        &self,
        chat_id: i64,
        is_online: bool,
        result: Result<(), PresenceSourceError>,
    ) {
        if let Err(error) = result {
            tracing::warn!(
                code = PRESENCE_REPORT_FAILED,
                chat_id,
                is_online,
                error = ?error,
                "presence report failed"
            );
        }
    }

    /// Takes a polled counterpart state, keeping the last known one on failure.
    pub fn record_poll(
        &mut self,
        chat_id: i64,
        result: Result<PresenceState, PresenceSourceError>,
    ) -> PresenceState {
        match result {
            Ok(state) => self.counterpart = state,
            Err(error) => tracing::warn!(
                code = PRESENCE_POLL_FAILED,
                chat_id,
                error = ?error,
                "counterpart presence poll failed; keeping last known state"
            ),
        }
        self.counterpart
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
