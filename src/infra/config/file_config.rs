use std::path::PathBuf;

use serde::Deserialize;

use crate::infra::config::{ApiConfig, AppConfig, ChatConfig, LogConfig, VisitorConfig};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub api: Option<FileApiConfig>,
    pub chat: Option<FileChatConfig>,
    pub visitor: Option<FileVisitorConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(api) = self.api {
            api.merge_into(&mut config.api);
        }

        if let Some(chat) = self.chat {
            chat.merge_into(&mut config.chat);
        }

        if let Some(visitor) = self.visitor {
            visitor.merge_into(&mut config.visitor);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }

        if self.file.is_some() {
            config.file = self.file;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileApiConfig {
    pub base_url: Option<String>,
    pub request_timeout_ms: Option<u64>,
}

impl FileApiConfig {
    fn merge_into(self, config: &mut ApiConfig) {
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }

        if let Some(timeout_ms) = self.request_timeout_ms {
            config.request_timeout_ms = timeout_ms;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileChatConfig {
    pub reference: Option<String>,
    pub foreground_sync_secs: Option<u64>,
    pub background_sync_secs: Option<u64>,
    pub heartbeat_secs: Option<u64>,
    pub presence_poll_secs: Option<u64>,
    pub tick_ms: Option<u64>,
    pub max_upload_bytes: Option<u64>,
    pub download_dir: Option<PathBuf>,
}

impl FileChatConfig {
    fn merge_into(self, config: &mut ChatConfig) {
        if let Some(reference) = self.reference {
            config.reference = reference;
        }

        let periods = [
            (self.foreground_sync_secs, &mut config.foreground_sync_secs),
            (self.background_sync_secs, &mut config.background_sync_secs),
            (self.heartbeat_secs, &mut config.heartbeat_secs),
            (self.presence_poll_secs, &mut config.presence_poll_secs),
            (self.tick_ms, &mut config.tick_ms),
            (self.max_upload_bytes, &mut config.max_upload_bytes),
        ];
        for (value, slot) in periods {
            if let Some(value) = value {
                *slot = value;
            }
        }

        if self.download_dir.is_some() {
            config.download_dir = self.download_dir;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileVisitorConfig {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl FileVisitorConfig {
    fn merge_into(self, config: &mut VisitorConfig) {
        if let Some(name) = self.name {
            config.name = name;
        }

        if self.email.is_some() {
            config.email = self.email;
        }
    }
}
