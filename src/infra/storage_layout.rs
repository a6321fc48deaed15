use std::path::PathBuf;

use crate::infra::error::AppError;

const APP_DIR_NAME: &str = "support-chat";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    pub download_dir: PathBuf,
}

impl StorageLayout {
    /// Resolves where saved attachments go: the configured directory, else the
    /// platform download directory, else `$HOME/Downloads`.
    pub fn resolve(configured: Option<PathBuf>) -> Result<Self, AppError> {
        let download_dir = configured
            .or_else(dirs::download_dir)
            .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| AppError::StoragePathResolution {
                details: "unable to resolve a download directory (XDG_DOWNLOAD_DIR/HOME)"
                    .into(),
            })?;

        Ok(Self { download_dir })
    }
}
