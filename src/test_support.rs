use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex, MutexGuard,
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::oneshot;

use crate::{
    domain::{
        message::{DeliveryStatus, FileInfo, Message, MessageKind, SenderRole},
        presence::PresenceState,
    },
    usecases::{
        contracts::NotificationSink,
        gallery::{AttachmentDownloader, AttachmentUrlResolver, DownloadSourceError},
        presence::{PresenceBackend, PresenceSourceError},
        send_message::{ConversationStarter, SendMessageSourceError},
        sync_messages::{ConversationSource, ConversationSourceError},
        upload_attachment::{
            AttachmentRequest, AttachmentUploader, ProgressCallback, UploadSourceError,
        },
    },
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().expect("env lock should not be poisoned")
}

pub fn message(id: i64, text: &str) -> Message {
    Message {
        id,
        sender: SenderRole::Visitor,
        kind: MessageKind::Text,
        text: Some(text.to_owned()),
        file_info: None,
        status: DeliveryStatus::Sent,
        created_at: Utc
            .timestamp_opt(1_700_000_000 + id, 0)
            .single()
            .expect("valid timestamp"),
        delivered_at: None,
        read_at: None,
        sender_name: None,
        is_anonymous: false,
    }
}

pub fn support_message(id: i64, text: &str) -> Message {
    Message {
        sender: SenderRole::Support,
        sender_name: Some("Support".to_owned()),
        ..message(id, text)
    }
}

pub fn image_message(id: i64, file_name: &str) -> Message {
    Message {
        kind: MessageKind::Image,
        text: None,
        file_info: Some(FileInfo {
            name: file_name.to_owned(),
            url: file_name.to_owned(),
            size: 3,
            mime_type: "image/png".to_owned(),
        }),
        ..message(id, "")
    }
}

#[derive(Debug, Default)]
struct StubState {
    chat_id: Option<i64>,
    assign_chat_id: i64,
    messages: Vec<Message>,
    next_message_id: i64,
    counterpart_online: bool,
    send_error: Option<SendMessageSourceError>,
    lookup_error: Option<SendMessageSourceError>,
    conversation_error: Option<ConversationSourceError>,
    mark_read_error: Option<ConversationSourceError>,
    held_fetch: Option<(Vec<Message>, oneshot::Receiver<()>)>,
    upload_error: Option<UploadSourceError>,
    presence_error: Option<PresenceSourceError>,
    sent_texts: Vec<String>,
    lookups: Vec<String>,
    fetches: Vec<i64>,
    mark_read_calls: usize,
    presence_reports: Vec<(i64, bool)>,
    presence_polls: usize,
    uploads: Vec<(i64, AttachmentRequest)>,
}

/// In-memory conversation server with scripted failures and captured calls.
#[derive(Debug)]
pub struct StubChatBackend {
    state: Mutex<StubState>,
}

impl Default for StubChatBackend {
    fn default() -> Self {
        Self {
            state: Mutex::new(StubState {
                assign_chat_id: 1,
                next_message_id: 1,
                ..StubState::default()
            }),
        }
    }
}

impl StubChatBackend {
    pub fn with_session(chat_id: i64, messages: Vec<Message>) -> Self {
        let backend = Self::default();
        {
            let mut state = backend.lock();
            state.next_message_id = messages.iter().map(|m| m.id).max().unwrap_or(0) + 1;
            state.chat_id = Some(chat_id);
            state.assign_chat_id = chat_id;
            state.messages = messages;
        }
        backend
    }

    pub fn assigning_chat_id(self, chat_id: i64) -> Self {
        self.lock().assign_chat_id = chat_id;
        self
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().expect("stub state lock")
    }

    pub fn push_message(&self, message: Message) {
        let mut state = self.lock();
        state.next_message_id = state.next_message_id.max(message.id + 1);
        state.messages.push(message);
    }

    pub fn set_counterpart_online(&self, online: bool) {
        self.lock().counterpart_online = online;
    }

    pub fn fail_send(&self, error: Option<SendMessageSourceError>) {
        self.lock().send_error = error;
    }

    pub fn fail_lookup(&self, error: Option<SendMessageSourceError>) {
        self.lock().lookup_error = error;
    }

    pub fn fail_conversation(&self, error: Option<ConversationSourceError>) {
        self.lock().conversation_error = error;
    }

    pub fn fail_mark_read(&self, error: Option<ConversationSourceError>) {
        self.lock().mark_read_error = error;
    }

    /// Freezes the conversation as it is now for the next fetch, which answers
    /// only once the returned sender fires or is dropped.
    pub fn hold_next_fetch(&self) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        let mut state = self.lock();
        let snapshot = state.messages.clone();
        state.held_fetch = Some((snapshot, gate));
        release
    }

    pub fn fail_upload(&self, error: Option<UploadSourceError>) {
        self.lock().upload_error = error;
    }

    pub fn fail_presence(&self, error: Option<PresenceSourceError>) {
        self.lock().presence_error = error;
    }

    pub fn conversation_snapshot(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.lock().sent_texts.clone()
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lock().lookups.clone()
    }

    pub fn conversation_fetches(&self) -> Vec<i64> {
        self.lock().fetches.clone()
    }

    pub fn mark_read_calls(&self) -> usize {
        self.lock().mark_read_calls
    }

    pub fn presence_reports(&self) -> Vec<(i64, bool)> {
        self.lock().presence_reports.clone()
    }

    pub fn presence_polls(&self) -> usize {
        self.lock().presence_polls
    }

    pub fn uploads(&self) -> Vec<(i64, AttachmentRequest)> {
        self.lock().uploads.clone()
    }
}

#[async_trait]
impl ConversationStarter for StubChatBackend {
    async fn check_existing(
        &self,
        reference: &str,
    ) -> Result<Option<i64>, SendMessageSourceError> {
        let mut state = self.lock();
        state.lookups.push(reference.to_owned());
        if let Some(error) = state.lookup_error.clone() {
            return Err(error);
        }
        Ok(state.chat_id)
    }

    async fn create_or_append(
        &self,
        _reference: &str,
        text: &str,
        sender_name: &str,
    ) -> Result<i64, SendMessageSourceError> {
        let mut state = self.lock();
        if let Some(error) = state.send_error.clone() {
            return Err(error);
        }

        let assign = state.assign_chat_id;
        let chat_id = *state.chat_id.get_or_insert(assign);
        let id = state.next_message_id;
        state.next_message_id += 1;
        state.sent_texts.push(text.to_owned());
        state.messages.push(Message {
            sender_name: Some(sender_name.to_owned()),
            ..message(id, text)
        });
        Ok(chat_id)
    }
}

#[async_trait]
impl ConversationSource for StubChatBackend {
    async fn get_conversation(
        &self,
        chat_id: i64,
    ) -> Result<Vec<Message>, ConversationSourceError> {
        let (snapshot, gate) = {
            let mut state = self.lock();
            state.fetches.push(chat_id);
            if let Some(error) = state.conversation_error.clone() {
                return Err(error);
            }
            if state.chat_id != Some(chat_id) {
                return Err(ConversationSourceError::NotFound);
            }
            let Some(held) = state.held_fetch.take() else {
                return Ok(state.messages.clone());
            };
            held
        };

        let _ = gate.await;
        Ok(snapshot)
    }

    async fn mark_read(&self, chat_id: i64) -> Result<(), ConversationSourceError> {
        let mut state = self.lock();
        state.mark_read_calls += 1;
        if let Some(error) = state.mark_read_error.clone() {
            return Err(error);
        }
        if state.chat_id != Some(chat_id) {
            return Err(ConversationSourceError::NotFound);
        }

        let now = Utc::now();
        for message in state
            .messages
            .iter_mut()
            .filter(|message| message.is_unread_incoming())
        {
            message.read_at = Some(now);
            message.status = DeliveryStatus::Read;
        }
        Ok(())
    }
}

#[async_trait]
impl AttachmentUploader for StubChatBackend {
    async fn send_with_attachment(
        &self,
        chat_id: i64,
        request: AttachmentRequest,
        on_progress: ProgressCallback,
    ) -> Result<Message, UploadSourceError> {
        let total = request.file.size();
        on_progress(total / 2, total);

        let mut state = self.lock();
        state.uploads.push((chat_id, request.clone()));
        if let Some(error) = state.upload_error.clone() {
            return Err(error);
        }
        on_progress(total, total);

        let id = state.next_message_id;
        state.next_message_id += 1;
        let stored = Message {
            kind: request.kind,
            text: request.content.clone(),
            file_info: Some(FileInfo {
                name: request.file.name.clone(),
                url: format!("uploads/{}", request.file.name),
                size: total,
                mime_type: request.file.mime_type.clone(),
            }),
            sender_name: Some(request.sender_name.clone()),
            ..message(id, "")
        };
        state.messages.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl PresenceBackend for StubChatBackend {
    async fn set_presence(
        &self,
        chat_id: i64,
        _reference: &str,
        is_online: bool,
    ) -> Result<(), PresenceSourceError> {
        let mut state = self.lock();
        if let Some(error) = state.presence_error.clone() {
            return Err(error);
        }
        state.presence_reports.push((chat_id, is_online));
        Ok(())
    }

    async fn get_presence(&self, _chat_id: i64) -> Result<PresenceState, PresenceSourceError> {
        let mut state = self.lock();
        state.presence_polls += 1;
        if let Some(error) = state.presence_error.clone() {
            return Err(error);
        }
        Ok(PresenceState {
            is_online: state.counterpart_online,
            last_seen_at: None,
        })
    }
}

impl AttachmentUrlResolver for StubChatBackend {
    fn resolve_attachment_url(&self, file: &FileInfo) -> Option<String> {
        let name = file.url.rsplit('/').next().unwrap_or_default();
        (!name.is_empty()).then(|| format!("https://files.test/{name}"))
    }
}

#[async_trait]
impl AttachmentDownloader for StubChatBackend {
    async fn download(&self, url: &str) -> Result<Vec<u8>, DownloadSourceError> {
        Ok(url.as_bytes().to_vec())
    }
}

/// Counts cues and remembers every badge value pushed to it.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    cues: AtomicUsize,
    badges: Mutex<Vec<usize>>,
}

impl RecordingNotifier {
    pub fn cues(&self) -> usize {
        self.cues.load(Ordering::SeqCst)
    }

    pub fn badges(&self) -> Vec<usize> {
        self.badges.lock().expect("badge lock").clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn play_cue(&self) {
        self.cues.fetch_add(1, Ordering::SeqCst);
    }

    fn set_badge(&self, unread: usize) {
        self.badges.lock().expect("badge lock").push(unread);
    }
}
