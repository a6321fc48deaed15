use std::{
    env,
    path::{Path, PathBuf},
};

use crate::infra::{
    config::{load, AppConfig},
    contracts::ConfigAdapter,
    error::AppError,
};

/// Environment variable consulted when `--config` is not given.
pub const CONFIG_PATH_ENV: &str = "SUPPORT_CHAT_CONFIG";

/// Reads `config.toml` style files. An explicit path wins over the environment.
#[derive(Debug, Clone, Default)]
pub struct FileConfigAdapter {
    path: Option<PathBuf>,
}

impl FileConfigAdapter {
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
        }
    }

    fn resolved_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(|| {
            env::var_os(CONFIG_PATH_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        })
    }
}

impl ConfigAdapter for FileConfigAdapter {
    fn load(&self) -> Result<AppConfig, AppError> {
        let path = self.resolved_path();
        tracing::debug!(path = ?path, "loading chat configuration");
        load(path.as_deref())
    }
}
