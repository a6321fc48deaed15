//! Use cases around the image gallery: building it from the store and saving a copy
//! of the image on screen.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::{
    fs,
    io::{AsyncWrite, AsyncWriteExt},
};

use crate::domain::{
    gallery::{derive_images, GalleryImage},
    message::FileInfo,
    message_store::MessageStore,
};

const MAX_NAME_ATTEMPTS: u32 = 1_000;

/// Turns a stored attachment name or URL into a fetchable location. No I/O.
pub trait AttachmentUrlResolver: Send + Sync {
    fn resolve_attachment_url(&self, file: &FileInfo) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadSourceError {
    NotFound,
    Unavailable,
}

#[async_trait]
pub trait AttachmentDownloader: Send + Sync {
    async fn download(&self, url: &str) -> Result<Vec<u8>, DownloadSourceError>;
}

#[derive(Debug, Error)]
pub enum SaveImageError {
    #[error("no image is being displayed")]
    NothingDisplayed,
    #[error("image is no longer available")]
    NotFound,
    #[error("image download temporarily unavailable")]
    TemporarilyUnavailable,
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Gallery images currently derivable from the store.
pub fn gallery_images(
    store: &MessageStore,
    resolver: &dyn AttachmentUrlResolver,
) -> Vec<GalleryImage> {
    derive_images(store.image_attachments(), |file| {
        resolver.resolve_attachment_url(file)
    })
}

/// Downloads `image` into `dir`, never overwriting an existing file.
pub async fn save_image(
    downloader: &dyn AttachmentDownloader,
    image: &GalleryImage,
    dir: &Path,
) -> Result<PathBuf, SaveImageError> {
    let bytes = downloader
        .download(&image.url)
        .await
        .map_err(|error| match error {
            DownloadSourceError::NotFound => SaveImageError::NotFound,
            DownloadSourceError::Unavailable => SaveImageError::TemporarilyUnavailable,
        })?;

    fs::create_dir_all(dir)
        .await
        .map_err(|source| SaveImageError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

    let path = write_new_file(dir, &safe_file_name(image), &bytes).await?;
    tracing::info!(
        code = "CHAT_GALLERY_IMAGE_SAVED",
        message_id = image.message_id,
        path = %path.display(),
        "gallery image saved"
    );
    Ok(path)
}

fn safe_file_name(image: &GalleryImage) -> String {
    let name = Path::new(&image.name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .trim();

    if name.is_empty() {
        format!("image-{}", image.message_id)
    } else {
        name.to_owned()
    }
}

async fn write_new_file(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, SaveImageError> {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(name);
    let extension = Path::new(name).extension().and_then(|ext| ext.to_str());

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let candidate = match (attempt, extension) {
            (0, _) => name.to_owned(),
            (n, Some(ext)) => format!("{stem}-{n}.{ext}"),
            (n, None) => format!("{stem}-{n}"),
        };
        let path = dir.join(candidate);

        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => {
                fill_new_file(&path, file, bytes).await?;
                return Ok(path);
            }
            Err(source) if source.kind() == ErrorKind::AlreadyExists => continue,
            Err(source) => return Err(SaveImageError::Write { path, source }),
        }
    }

    Err(SaveImageError::Write {
        path: dir.join(name),
        source: ErrorKind::AlreadyExists.into(),
    })
}

/// Writes `bytes` into a file this call just created. A half-written file is removed.
async fn fill_new_file<W>(path: &Path, mut file: W, bytes: &[u8]) -> Result<(), SaveImageError>
where
    W: AsyncWrite + Unpin,
{
    let written = match file.write_all(bytes).await {
        Ok(()) => file.flush().await,
        Err(error) => Err(error),
    };
    drop(file);

    let Err(source) = written else {
        return Ok(());
    };
    if let Err(error) = fs::remove_file(path).await {
        tracing::warn!(
            code = "CHAT_GALLERY_PARTIAL_FILE_LEFT",
            path = %path.display(),
            error = %error,
            "failed to remove partially written image"
        );
    }
    Err(SaveImageError::Write {
        path: path.to_path_buf(),
        source,
    })
}
