use crate::usecases::contracts::NotificationSink;

#[cfg(test)]
use crate::infra::{config::AppConfig, contracts::ConfigAdapter, error::AppError};

#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct StubConfigAdapter;

#[cfg(test)]
impl ConfigAdapter for StubConfigAdapter {
    fn load(&self) -> Result<AppConfig, AppError> {
        Ok(AppConfig::default())
    }
}

/// Drops cues and badge updates; used by one-shot commands with no widget on screen.
#[derive(Debug, Clone, Default)]
pub struct SilentNotifier;

impl NotificationSink for SilentNotifier {
    fn play_cue(&self) {}

    fn set_badge(&self, _unread: usize) {}
}
