//! Use case for attaching a single file to the conversation.
//!
//! A selected file lives here as a pending upload until the server confirms it.
//! It never enters the message store directly: after a successful upload the
//! caller re-syncs and the server copy appears with its assigned id and URL.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    message::{Message, MessageKind},
    upload::{
        validate_selection, AllowList, PendingUpload, SelectedFile, UploadState,
        UploadValidationError,
    },
};

/// Receives `(bytes_sent, bytes_total)` while the body is streamed.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRequest {
    pub file: SelectedFile,
    pub kind: MessageKind,
    pub sender_name: String,
    pub sender_email: Option<String>,
    pub content: Option<String>,
}

/// Errors that can occur at the source level (upload endpoint).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSourceError {
    Unauthorized,
    Rejected(String),
    Unavailable,
    InvalidData,
}

#[async_trait]
pub trait AttachmentUploader: Send + Sync {
    async fn send_with_attachment(
        &self,
        chat_id: i64,
        request: AttachmentRequest,
        on_progress: ProgressCallback,
    ) -> Result<Message, UploadSourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] UploadValidationError),
    #[error("no attachment selected")]
    NothingPending,
    #[error("an upload is already in progress")]
    AlreadyUploading,
    #[error("not authorized to upload files")]
    Unauthorized,
    #[error("upload was rejected: {0}")]
    Rejected(String),
    #[error("upload service temporarily unavailable")]
    TemporarilyUnavailable,
}

/// Who is uploading, as shown to support staff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploaderIdentity {
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AttachmentUploadManager {
    pending: Option<PendingUpload>,
    max_bytes: u64,
}

impl AttachmentUploadManager {
    pub fn new(max_bytes: u64) -> Self {
        Self {
            pending: None,
            max_bytes,
        }
    }

    pub fn pending(&self) -> Option<&PendingUpload> {
        self.pending.as_ref()
    }

    /// Validates `file` and makes it the pending upload, replacing any idle or
    /// failed one.
    pub fn select_file(
        &mut self,
        file: SelectedFile,
        conversation_started: bool,
        allow: AllowList,
    ) -> Result<&PendingUpload, UploadError> {
        if self.is_uploading() {
            return Err(UploadError::AlreadyUploading);
        }

        let pending = validate_selection(file, conversation_started, self.max_bytes, allow)?;
        tracing::debug!(
            file_name = %pending.file.name,
            size = pending.file.size(),
            mime_type = %pending.file.mime_type,
            "attachment selected"
        );
        Ok(&*self.pending.insert(pending))
    }

    /// Drops the pending upload unless it is mid-transfer.
    pub fn cancel(&mut self) -> bool {
        if self.is_uploading() {
            return false;
        }
        self.pending.take().is_some()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn is_uploading(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| pending.state == UploadState::Uploading)
    }

    /// Marks the pending file as uploading and builds the request for it.
    ///
    /// The returned callback writes into the shared progress cell, so progress is
    /// visible while the call is in flight.
    pub fn begin_send(
        &mut self,
        identity: &UploaderIdentity,
        caption: Option<String>,
    ) -> Result<(AttachmentRequest, ProgressCallback), UploadError> {
        let pending = self.pending.as_mut().ok_or(UploadError::NothingPending)?;
        if pending.state == UploadState::Uploading {
            return Err(UploadError::AlreadyUploading);
        }

        pending.state = UploadState::Uploading;
        pending.progress.set(0);

        let request = AttachmentRequest {
            file: pending.file.clone(),
            kind: pending.kind(),
            sender_name: identity.name.clone(),
            sender_email: identity.email.clone(),
            content: caption.filter(|text| !text.trim().is_empty()),
        };
        let progress = pending.progress.clone();
        let on_progress: ProgressCallback =
            Arc::new(move |sent, total| progress.set_fraction(sent, total));

        Ok((request, on_progress))
    }

    /// Settles an upload started with `begin_send`. On failure the pending file is
    /// kept for a retry.
    pub fn finish_send(
        &mut self,
        chat_id: i64,
        result: Result<Message, UploadSourceError>,
    ) -> Result<Message, UploadError> {
        match result {
            Ok(message) => {
                tracing::info!(
                    code = "CHAT_UPLOAD_COMPLETED",
                    chat_id,
                    message_id = message.id,
                    "attachment uploaded"
                );
                self.pending = None;
                Ok(message)
            }
            Err(error) => {
                tracing::warn!(
                    code = "CHAT_UPLOAD_FAILED",
                    chat_id,
                    error = ?error,
                    "attachment upload failed; keeping file for retry"
                );
                if let Some(pending) = self.pending.as_mut() {
                    pending.state = UploadState::Failed;
                }
                Err(map_source_error(error))
            }
        }
    }
}

fn map_source_error(error: UploadSourceError) -> UploadError {
    match error {
        UploadSourceError::Unauthorized => UploadError::Unauthorized,
        UploadSourceError::Rejected(reason) => UploadError::Rejected(reason),
        UploadSourceError::Unavailable | UploadSourceError::InvalidData => {
            UploadError::TemporarilyUnavailable
        }
    }
}
