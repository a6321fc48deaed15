use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::upload::DEFAULT_MAX_UPLOAD_BYTES;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub api: ApiConfig,
    pub chat: ChatConfig,
    pub visitor: VisitorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    /// When set, logs go to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api/".to_owned(),
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatConfig {
    pub reference: String,
    pub foreground_sync_secs: u64,
    pub background_sync_secs: u64,
    pub heartbeat_secs: u64,
    pub presence_poll_secs: u64,
    pub tick_ms: u64,
    pub max_upload_bytes: u64,
    /// Where gallery images are saved; defaults to the user's download directory.
    pub download_dir: Option<PathBuf>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reference: "default".to_owned(),
            foreground_sync_secs: 5,
            background_sync_secs: 10,
            heartbeat_secs: 30,
            presence_poll_secs: 30,
            tick_ms: 250,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            download_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VisitorConfig {
    pub name: String,
    pub email: Option<String>,
}

impl Default for VisitorConfig {
    fn default() -> Self {
        Self {
            name: "Visitor".to_owned(),
            email: None,
        }
    }
}
