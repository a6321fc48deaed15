//! reqwest-backed implementation of every remote source the widget consumes.

use std::time::Duration;

use async_trait::async_trait;
use futures::{stream, Stream};
use reqwest::{multipart, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    chat_api::wire::{
        AttachmentResponse, CheckExistingResponse, ConversationResponse, CreateOrAppendRequest,
        CreateOrAppendResponse, PresenceRequest, PresenceResponse, SuccessResponse,
    },
    domain::{
        message::{FileInfo, Message},
        presence::PresenceState,
    },
    infra::{config::ApiConfig, error::AppError},
    usecases::{
        gallery::{AttachmentDownloader, AttachmentUrlResolver, DownloadSourceError},
        presence::{PresenceBackend, PresenceSourceError},
        send_message::{ConversationStarter, SendMessageSourceError},
        sync_messages::{ConversationSource, ConversationSourceError},
        upload_attachment::{
            AttachmentRequest, AttachmentUploader, ProgressCallback, UploadSourceError,
        },
    },
};

const REQUEST_FAILED: &str = "CHAT_API_REQUEST_FAILED";
const DECODE_FAILED: &str = "CHAT_API_DECODE_FAILED";
const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;
const UPLOADS_PATH: &str = "uploads/";

/// Transport-level failure, narrowed per use case by the `From` impls below.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ApiError {
    Unauthorized,
    NotFound,
    Rejected(String),
    Unavailable,
    InvalidData,
}

impl From<ApiError> for ConversationSourceError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Unauthorized => Self::Unauthorized,
            ApiError::NotFound => Self::NotFound,
            ApiError::Rejected(_) | ApiError::Unavailable => Self::Unavailable,
            ApiError::InvalidData => Self::InvalidData,
        }
    }
}

impl From<ApiError> for SendMessageSourceError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Unauthorized => Self::Unauthorized,
            ApiError::Rejected(reason) => Self::Rejected(reason),
            ApiError::NotFound | ApiError::Unavailable => Self::Unavailable,
            ApiError::InvalidData => Self::InvalidData,
        }
    }
}

impl From<ApiError> for UploadSourceError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Unauthorized => Self::Unauthorized,
            ApiError::Rejected(reason) => Self::Rejected(reason),
            ApiError::NotFound => Self::Rejected("conversation not found".to_owned()),
            ApiError::Unavailable => Self::Unavailable,
            ApiError::InvalidData => Self::InvalidData,
        }
    }
}

impl From<ApiError> for PresenceSourceError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Unauthorized => Self::Unauthorized,
            ApiError::NotFound => Self::NotFound,
            ApiError::Rejected(_) | ApiError::Unavailable => Self::Unavailable,
            ApiError::InvalidData => Self::InvalidData,
        }
    }
}

impl From<ApiError> for DownloadSourceError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::NotFound => Self::NotFound,
            _ => Self::Unavailable,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpChatApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpChatApi {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let base_url = parse_base_url(&config.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(AppError::HttpClient)?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url.join(path).map_err(|error| {
            tracing::error!(code = REQUEST_FAILED, path, error = %error, "invalid endpoint path");
            ApiError::InvalidData
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|error| {
            tracing::debug!(code = REQUEST_FAILED, operation, error = %error, "request failed");
            ApiError::Unavailable
        })?;

        if let Some(error) = classify_status(response.status()) {
            tracing::debug!(
                code = REQUEST_FAILED,
                operation,
                status = response.status().as_u16(),
                "request answered with an error status"
            );
            return Err(error);
        }

        response.json::<T>().await.map_err(|error| {
            tracing::warn!(code = DECODE_FAILED, operation, error = %error, "unexpected response body");
            ApiError::InvalidData
        })
    }

    async fn check_existing_chat(&self, reference: &str) -> Result<Option<i64>, ApiError> {
        let mut url = self.endpoint("chat/check")?;
        url.query_pairs_mut().append_pair("reference", reference);

        let response: CheckExistingResponse =
            self.send_json("check_existing", self.client.get(url)).await?;
        Ok(response.into_chat_id())
    }

    async fn post_message(
        &self,
        reference: &str,
        text: &str,
        sender_name: &str,
    ) -> Result<i64, ApiError> {
        let url = self.endpoint("chat/message")?;
        let body = CreateOrAppendRequest {
            reference,
            message: text,
            sender_name,
        };

        let response: CreateOrAppendResponse = self
            .send_json("create_or_append", self.client.post(url).json(&body))
            .await?;

        match (response.success, response.chat_id) {
            (true, Some(chat_id)) => Ok(chat_id),
            _ => Err(ApiError::Rejected(
                response
                    .error
                    .unwrap_or_else(|| "message was not accepted".to_owned()),
            )),
        }
    }

    async fn fetch_conversation(&self, chat_id: i64) -> Result<Vec<Message>, ApiError> {
        let url = self.endpoint(&format!("chat/{chat_id}/messages"))?;
        let response: ConversationResponse =
            self.send_json("get_conversation", self.client.get(url)).await?;

        Ok(response.messages.into_iter().map(Message::from).collect())
    }

    async fn post_read(&self, chat_id: i64) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("chat/{chat_id}/read"))?;
        let response: SuccessResponse = self.send_json("mark_read", self.client.post(url)).await?;
        expect_success(response)
    }

    async fn post_presence(
        &self,
        chat_id: i64,
        reference: &str,
        is_online: bool,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("chat/{chat_id}/presence"))?;
        let body = PresenceRequest {
            reference,
            is_online,
        };
        let response: SuccessResponse = self
            .send_json("set_presence", self.client.post(url).json(&body))
            .await?;
        expect_success(response)
    }

    async fn fetch_presence(&self, chat_id: i64) -> Result<PresenceState, ApiError> {
        let url = self.endpoint(&format!("chat/{chat_id}/presence"))?;
        let response: PresenceResponse =
            self.send_json("get_presence", self.client.get(url)).await?;
        Ok(response.into())
    }

    async fn post_attachment(
        &self,
        chat_id: i64,
        request: AttachmentRequest,
        on_progress: ProgressCallback,
    ) -> Result<Message, ApiError> {
        let url = self.endpoint(&format!("chat/{chat_id}/attachments"))?;
        let total = request.file.size();
        let AttachmentRequest {
            file,
            kind,
            sender_name,
            sender_email,
            content,
        } = request;

        let body = reqwest::Body::wrap_stream(progress_stream(file.bytes, on_progress));
        let part = multipart::Part::stream_with_length(body, total)
            .file_name(file.name)
            .mime_str(&file.mime_type)
            .map_err(|_| ApiError::Rejected(format!("invalid MIME type {}", file.mime_type)))?;

        let mut form = multipart::Form::new()
            .text("type", kind.as_wire())
            .text("senderName", sender_name);
        if let Some(email) = sender_email {
            form = form.text("senderEmail", email);
        }
        if let Some(content) = content {
            form = form.text("content", content);
        }
        let form = form.part("file", part);

        let response: AttachmentResponse = self
            .send_json("send_with_attachment", self.client.post(url).multipart(form))
            .await?;

        match (response.success, response.message) {
            (true, Some(message)) => Ok(message.into()),
            _ => Err(ApiError::Rejected(
                response
                    .error
                    .unwrap_or_else(|| "attachment was not accepted".to_owned()),
            )),
        }
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.client.get(url).send().await.map_err(|error| {
            tracing::debug!(code = REQUEST_FAILED, operation = "download", error = %error, "request failed");
            ApiError::Unavailable
        })?;

        if let Some(error) = classify_status(response.status()) {
            return Err(error);
        }

        let bytes = response.bytes().await.map_err(|_| ApiError::Unavailable)?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ConversationStarter for HttpChatApi {
    async fn check_existing(
        &self,
        reference: &str,
    ) -> Result<Option<i64>, SendMessageSourceError> {
        Ok(self.check_existing_chat(reference).await?)
    }

    async fn create_or_append(
        &self,
        reference: &str,
        text: &str,
        sender_name: &str,
    ) -> Result<i64, SendMessageSourceError> {
        Ok(self.post_message(reference, text, sender_name).await?)
    }
}

#[async_trait]
impl ConversationSource for HttpChatApi {
    async fn get_conversation(
        &self,
        chat_id: i64,
    ) -> Result<Vec<Message>, ConversationSourceError> {
        Ok(self.fetch_conversation(chat_id).await?)
    }

    async fn mark_read(&self, chat_id: i64) -> Result<(), ConversationSourceError> {
        Ok(self.post_read(chat_id).await?)
    }
}

#[async_trait]
impl AttachmentUploader for HttpChatApi {
    async fn send_with_attachment(
        &self,
        chat_id: i64,
        request: AttachmentRequest,
        on_progress: ProgressCallback,
    ) -> Result<Message, UploadSourceError> {
        Ok(self.post_attachment(chat_id, request, on_progress).await?)
    }
}

#[async_trait]
impl PresenceBackend for HttpChatApi {
    async fn set_presence(
        &self,
        chat_id: i64,
        reference: &str,
        is_online: bool,
    ) -> Result<(), PresenceSourceError> {
        Ok(self.post_presence(chat_id, reference, is_online).await?)
    }

    async fn get_presence(&self, chat_id: i64) -> Result<PresenceState, PresenceSourceError> {
        Ok(self.fetch_presence(chat_id).await?)
    }
}

#[async_trait]
impl AttachmentDownloader for HttpChatApi {
    async fn download(&self, url: &str) -> Result<Vec<u8>, DownloadSourceError> {
        Ok(self.fetch_bytes(url).await?)
    }
}

impl AttachmentUrlResolver for HttpChatApi {
    fn resolve_attachment_url(&self, file: &FileInfo) -> Option<String> {
        resolve_against(&self.base_url, file)
    }
}

/// Base URLs are directories: without a trailing slash `join` would drop the last
/// path segment.
fn parse_base_url(raw: &str) -> Result<Url, AppError> {
    let trimmed = raw.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/")
    };

    Url::parse(&normalized).map_err(|source| AppError::InvalidBaseUrl {
        url: raw.to_owned(),
        source,
    })
}

/// Absolute and data URLs pass through; bare file names live under `uploads/`;
/// anything else is relative to the API base.
fn resolve_against(base: &Url, file: &FileInfo) -> Option<String> {
    let raw = [file.url.trim(), file.name.trim()]
        .into_iter()
        .find(|candidate| !candidate.is_empty())?;

    if raw.starts_with("data:") {
        return Some(raw.to_owned());
    }
    if let Ok(absolute) = Url::parse(raw) {
        return Some(absolute.into());
    }

    let resolved = if raw.contains('/') {
        base.join(raw)
    } else {
        base.join(UPLOADS_PATH).and_then(|uploads| uploads.join(raw))
    };
    resolved.ok().map(String::from)
}

fn classify_status(status: StatusCode) -> Option<ApiError> {
    if status.is_success() {
        return None;
    }

    Some(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound,
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => ApiError::Unavailable,
        status if status.is_client_error() => ApiError::Rejected(status.to_string()),
        _ => ApiError::Unavailable,
    })
}

fn expect_success(response: SuccessResponse) -> Result<(), ApiError> {
    if response.success {
        Ok(())
    } else {
        Err(ApiError::Rejected(
            response.error.unwrap_or_else(|| "request was not accepted".to_owned()),
        ))
    }
}

/// Splits an upload into chunks, reporting cumulative progress as each is handed
/// to the transport.
fn progress_stream(
    bytes: Vec<u8>,
    on_progress: ProgressCallback,
) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> + Send + Sync + 'static {
    let total = bytes.len() as u64;
    let chunks: Vec<Vec<u8>> = bytes
        .chunks(UPLOAD_CHUNK_BYTES)
        .map(<[u8]>::to_vec)
        .collect();

    let mut sent = 0u64;
    stream::iter(chunks.into_iter().map(move |chunk| {
        sent += chunk.len() as u64;
        on_progress(sent, total);
        Ok(chunk)
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use futures::StreamExt;

    use super::*;

    fn file(name: &str, url: &str) -> FileInfo {
        FileInfo {
            name: name.to_owned(),
            url: url.to_owned(),
            size: 1,
            mime_type: "image/png".to_owned(),
        }
    }

    fn base() -> Url {
        parse_base_url("https://support.example.test/api").expect("valid base")
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        assert_eq!(base().as_str(), "https://support.example.test/api/");
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let err = parse_base_url("not a url").expect_err("must fail");

        assert!(matches!(err, AppError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn bare_file_name_resolves_under_uploads() {
        assert_eq!(
            resolve_against(&base(), &file("shot.png", "shot.png")).as_deref(),
            Some("https://support.example.test/api/uploads/shot.png")
        );
    }

    #[test]
    fn relative_and_absolute_urls_resolve() {
        assert_eq!(
            resolve_against(&base(), &file("a.png", "files/a.png")).as_deref(),
            Some("https://support.example.test/api/files/a.png")
        );
        assert_eq!(
            resolve_against(&base(), &file("a.png", "/static/a.png")).as_deref(),
            Some("https://support.example.test/static/a.png")
        );
        assert_eq!(
            resolve_against(&base(), &file("a.png", "https://cdn.example.test/a.png")).as_deref(),
            Some("https://cdn.example.test/a.png")
        );
        assert_eq!(
            resolve_against(&base(), &file("a.png", "data:image/png;base64,AAAA")).as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }

    #[test]
    fn missing_url_falls_back_to_name_then_none() {
        assert_eq!(
            resolve_against(&base(), &file("b.png", "  ")).as_deref(),
            Some("https://support.example.test/api/uploads/b.png")
        );
        assert_eq!(resolve_against(&base(), &file("", "")), None);
    }

    #[test]
    fn statuses_map_to_error_classes() {
        assert_eq!(classify_status(StatusCode::OK), None);
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN),
            Some(ApiError::Unauthorized)
        );
        assert_eq!(classify_status(StatusCode::NOT_FOUND), Some(ApiError::NotFound));
        assert!(matches!(
            classify_status(StatusCode::PAYLOAD_TOO_LARGE),
            Some(ApiError::Rejected(_))
        ));
        assert_eq!(
            classify_status(StatusCode::BAD_GATEWAY),
            Some(ApiError::Unavailable)
        );
    }

    #[test]
    fn upload_not_found_is_a_rejection() {
        assert_eq!(
            UploadSourceError::from(ApiError::NotFound),
            UploadSourceError::Rejected("conversation not found".to_owned())
        );
    }

    #[tokio::test]
    async fn progress_is_reported_per_chunk() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let on_progress: ProgressCallback = Arc::new(move |sent, total| {
            recorder.lock().expect("progress lock").push((sent, total));
        });

        let chunks: Vec<_> = progress_stream(vec![0; UPLOAD_CHUNK_BYTES + 10], on_progress)
            .collect()
            .await;

        assert_eq!(chunks.len(), 2);
        let total = (UPLOAD_CHUNK_BYTES + 10) as u64;
        assert_eq!(
            *seen.lock().expect("progress lock"),
            vec![(UPLOAD_CHUNK_BYTES as u64, total), (total, total)]
        );
    }

    #[test]
    fn client_builds_from_default_config() {
        let api = HttpChatApi::new(&ApiConfig::default()).expect("client builds");

        assert_eq!(api.base_url().as_str(), "http://localhost:3000/api/");
    }
}
