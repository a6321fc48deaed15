use std::time::Duration;

use tracing_appender::non_blocking::WorkerGuard;

use crate::{
    chat_api::HttpChatApi,
    infra::{config::AppConfig, storage_layout::StorageLayout},
    usecases::{upload_attachment::UploaderIdentity, widget::WidgetSettings},
};

#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    pub api: HttpChatApi,
    pub storage: StorageLayout,
    log_guard: Option<WorkerGuard>,
}

impl AppContext {
    pub fn new(config: AppConfig, api: HttpChatApi, storage: StorageLayout) -> Self {
        Self {
            config,
            api,
            storage,
            log_guard: None,
        }
    }

    /// Keeps the non-blocking log writer alive for as long as the context lives.
    pub fn hold_log_guard(&mut self, guard: Option<WorkerGuard>) {
        self.log_guard = guard;
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.config.chat.tick_ms.max(1))
    }

    pub fn widget_settings(&self) -> WidgetSettings {
        let chat = &self.config.chat;
        WidgetSettings {
            reference: chat.reference.clone(),
            visitor: UploaderIdentity {
                name: self.config.visitor.name.clone(),
                email: self.config.visitor.email.clone(),
            },
            foreground_sync_every: Duration::from_secs(chat.foreground_sync_secs),
            background_sync_every: Duration::from_secs(chat.background_sync_secs),
            heartbeat_every: Duration::from_secs(chat.heartbeat_secs),
            presence_poll_every: Duration::from_secs(chat.presence_poll_secs),
            max_upload_bytes: chat.max_upload_bytes,
            download_dir: self.storage.download_dir.clone(),
        }
    }
}
