//! Pending attachment state and the rules a file must pass before upload.

use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use super::message::MessageKind;

/// Upload size ceiling for the public chat widget (25 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

const IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

const FILE_TYPES: [&str; 9] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "video/mp4",
    "video/webm",
    "video/quicktime",
];

/// MIME allow-list, chosen by the call site that opened the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowList {
    Images,
    Files,
}

impl AllowList {
    pub fn permits(self, mime_type: &str) -> bool {
        let mime_type = mime_type.trim().to_ascii_lowercase();
        let allowed: &[&str] = match self {
            Self::Images => &IMAGE_TYPES,
            Self::Files => &FILE_TYPES,
        };
        allowed.contains(&mime_type.as_str())
    }
}

/// A raw file handed over by the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadValidationError {
    #[error("start conversation first")]
    ConversationNotStarted,
    #[error("file is too large ({size} bytes, limit {max} bytes)")]
    TooLarge { size: u64, max: u64 },
    #[error("file type {mime_type} is not allowed")]
    UnsupportedType { mime_type: String },
}

impl UploadValidationError {
    /// Short machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::ConversationNotStarted => "conversation",
            Self::TooLarge { .. } => "size",
            Self::UnsupportedType { .. } => "type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Uploading,
    Failed,
}

/// Upload percentage shared between the transfer and whoever renders it.
#[derive(Debug, Clone, Default)]
pub struct UploadProgress(Arc<AtomicU8>);

impl UploadProgress {
    pub fn get(&self) -> u8 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, percent: u8) {
        self.0.store(percent.min(100), Ordering::Relaxed);
    }

    /// Records progress from a byte count, rounding down.
    pub fn set_fraction(&self, sent: u64, total: u64) {
        let percent = if total == 0 {
            100
        } else {
            (sent.min(total) * 100 / total) as u8
        };
        self.set(percent);
    }
}

#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub file: SelectedFile,
    pub preview_url: Option<String>,
    pub progress: UploadProgress,
    pub state: UploadState,
}

impl PendingUpload {
    pub fn kind(&self) -> MessageKind {
        MessageKind::from_mime(&self.file.mime_type)
    }
}

/// Validates a picked file and builds its pending upload.
///
/// Rules apply in order and the first failure wins: conversation exists, size is
/// within `max_bytes`, MIME type is on the allow-list.
pub fn validate_selection(
    file: SelectedFile,
    conversation_started: bool,
    max_bytes: u64,
    allow: AllowList,
) -> Result<PendingUpload, UploadValidationError> {
    if !conversation_started {
        return Err(UploadValidationError::ConversationNotStarted);
    }

    if file.size() > max_bytes {
        return Err(UploadValidationError::TooLarge {
            size: file.size(),
            max: max_bytes,
        });
    }

    if !allow.permits(&file.mime_type) {
        return Err(UploadValidationError::UnsupportedType {
            mime_type: file.mime_type.clone(),
        });
    }

    let preview_url = preview_data_url(&file);

    Ok(PendingUpload {
        file,
        preview_url,
        progress: UploadProgress::default(),
        state: UploadState::Idle,
    })
}

/// Inline `data:` URL for images so the preview renders before the network completes.
fn preview_data_url(file: &SelectedFile) -> Option<String> {
    if MessageKind::from_mime(&file.mime_type) != MessageKind::Image {
        return None;
    }

    Some(format!(
        "data:{};base64,{}",
        file.mime_type,
        STANDARD.encode(&file.bytes)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, mime_type: &str, size: usize) -> SelectedFile {
        SelectedFile {
            name: name.to_owned(),
            mime_type: mime_type.to_owned(),
            bytes: vec![0; size],
        }
    }

    #[test]
    fn rejects_when_conversation_not_started_before_other_rules() {
        let oversized = file("big.exe", "application/x-msdownload", 30 * 1024 * 1024);

        let err = validate_selection(oversized, false, DEFAULT_MAX_UPLOAD_BYTES, AllowList::Files)
            .expect_err("must fail");

        assert_eq!(err, UploadValidationError::ConversationNotStarted);
        assert_eq!(err.to_string(), "start conversation first");
    }

    #[test]
    fn rejects_thirty_mib_image_on_size() {
        let image = file("huge.png", "image/png", 30 * 1024 * 1024);

        let err = validate_selection(image, true, DEFAULT_MAX_UPLOAD_BYTES, AllowList::Images)
            .expect_err("must fail");

        assert_eq!(err.reason(), "size");
    }

    #[test]
    fn size_rule_wins_over_type_rule() {
        let bad = file("huge.bin", "application/octet-stream", 26 * 1024 * 1024);

        let err = validate_selection(bad, true, DEFAULT_MAX_UPLOAD_BYTES, AllowList::Files)
            .expect_err("must fail");

        assert_eq!(err.reason(), "size");
    }

    #[test]
    fn allow_lists_differ_by_call_site() {
        assert!(AllowList::Images.permits("image/webp"));
        assert!(!AllowList::Images.permits("application/pdf"));
        assert!(AllowList::Files.permits("application/pdf"));
        assert!(AllowList::Files.permits("video/mp4"));
        assert!(!AllowList::Files.permits("image/png"));
        assert!(AllowList::Images.permits("IMAGE/PNG"));
    }

    #[test]
    fn rejects_type_outside_allow_list() {
        let pdf = file("doc.pdf", "application/pdf", 10);

        let err = validate_selection(pdf, true, DEFAULT_MAX_UPLOAD_BYTES, AllowList::Images)
            .expect_err("must fail");

        assert!(matches!(err, UploadValidationError::UnsupportedType { .. }));
    }

    #[test]
    fn image_selection_gets_data_url_preview() {
        let image = file("a.png", "image/png", 3);

        let pending = validate_selection(image, true, DEFAULT_MAX_UPLOAD_BYTES, AllowList::Images)
            .expect("must validate");

        assert_eq!(pending.state, UploadState::Idle);
        assert_eq!(pending.progress.get(), 0);
        assert_eq!(
            pending.preview_url.as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }

    #[test]
    fn non_image_selection_has_no_preview() {
        let pdf = file("doc.pdf", "application/pdf", 3);

        let pending = validate_selection(pdf, true, DEFAULT_MAX_UPLOAD_BYTES, AllowList::Files)
            .expect("must validate");

        assert!(pending.preview_url.is_none());
        assert_eq!(pending.kind(), MessageKind::File);
    }

    #[test]
    fn progress_fraction_is_clamped() {
        let progress = UploadProgress::default();

        progress.set_fraction(50, 200);
        assert_eq!(progress.get(), 25);

        progress.set_fraction(300, 200);
        assert_eq!(progress.get(), 100);

        progress.set_fraction(0, 0);
        assert_eq!(progress.get(), 100);
    }
}
