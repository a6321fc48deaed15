//! The chat widget controller.
//!
//! Owns the lifecycle state machine and derives from it which polling loops run:
//! the background sync loop lives as long as a session is known, while the
//! foreground sync, heartbeat and presence loops run only while the widget is open.
//!
//! Network calls never block the controller. Each one is pushed into an in-flight
//! set and its result is applied when the host drives `complete_next`, so user
//! actions keep flowing while a slow fetch is outstanding.

use std::{
    future::Future,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Utc;
use futures::{
    future::LocalBoxFuture,
    stream::FuturesUnordered,
    FutureExt, StreamExt,
};

use crate::domain::{
    gallery::{GalleryNavigator, GalleryView},
    message::{DeliveryStatus, FileInfo, Message, SenderRole},
    message_store::MessageStore,
    notification::{NotificationTrigger, TriggerOutcome},
    presence::PresenceState,
    session::ChatSession,
    upload::{AllowList, PendingUpload, SelectedFile},
    widget_state::{WidgetEvent, WidgetState},
};

use super::{
    contracts::{ChatBackend, NotificationSink},
    gallery::{gallery_images, save_image, SaveImageError},
    presence::{PresenceBackend, PresenceHeartbeat, PresenceSourceError},
    scheduler::{LoopName, Scheduler, TaskKey},
    send_message::{find_existing_session, send_message, SendMessageCommand, SendMessageError},
    sync_messages::{
        fetch_conversation, mark_conversation_read, FetchTicket, MessageSynchronizer,
        SyncError, SyncReport,
    },
    upload_attachment::{
        AttachmentUploadManager, AttachmentUploader, UploadError, UploadSourceError,
        UploaderIdentity,
    },
};

const SYNC_FETCH_FAILED: &str = "CHAT_SYNC_FETCH_FAILED";
const MARK_READ_FAILED: &str = "CHAT_MARK_READ_FAILED";
const SESSION_LOOKUP_FAILED: &str = "CHAT_SESSION_LOOKUP_FAILED";
const SEND_FAILED: &str = "CHAT_SEND_FAILED";
const SAVE_FAILED: &str = "CHAT_GALLERY_SAVE_FAILED";

/// Id used for the optimistic attachment preview; never assigned by the server.
const LOCAL_PREVIEW_ID: i64 = -1;

const FOREGROUND_LOOPS: [LoopName; 3] = [
    LoopName::ForegroundSync,
    LoopName::Heartbeat,
    LoopName::PresencePoll,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetSettings {
    pub reference: String,
    pub visitor: UploaderIdentity,
    pub foreground_sync_every: Duration,
    pub background_sync_every: Duration,
    pub heartbeat_every: Duration,
    pub presence_poll_every: Duration,
    pub max_upload_bytes: u64,
    pub download_dir: PathBuf,
}

impl WidgetSettings {
    fn period(&self, loop_name: LoopName) -> Duration {
        match loop_name {
            LoopName::ForegroundSync => self.foreground_sync_every,
            LoopName::BackgroundSync => self.background_sync_every,
            LoopName::Heartbeat => self.heartbeat_every,
            LoopName::PresencePoll => self.presence_poll_every,
        }
    }
}

/// Outcome of a finished call that the host should tell the user about.
#[derive(Debug)]
pub enum Notice {
    AttachmentSent,
    UploadFailed(UploadError),
    SendFailed(SendMessageError),
    ImageSaved(PathBuf),
    SaveFailed(SaveImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncMode {
    Foreground,
    Background,
}

/// A finished network call, tagged with what it was made for.
enum CallResult {
    SessionLookup {
        reference: String,
        result: Result<Option<ChatSession>, SendMessageError>,
    },
    MessageSent {
        reference: String,
        text: String,
        result: Result<ChatSession, SendMessageError>,
    },
    Fetched {
        mode: SyncMode,
        chat_id: i64,
        ticket: FetchTicket,
        result: Result<Vec<Message>, SyncError>,
    },
    MarkedRead {
        chat_id: i64,
        result: Result<(), SyncError>,
    },
    PresenceReported {
        chat_id: i64,
        is_online: bool,
        result: Result<(), PresenceSourceError>,
    },
    CounterpartPolled {
        chat_id: i64,
        result: Result<PresenceState, PresenceSourceError>,
    },
    Uploaded {
        chat_id: i64,
        result: Result<Message, UploadSourceError>,
    },
    ImageSaved(Result<PathBuf, SaveImageError>),
}

pub struct ChatWidget<B, N>
where
    B: ChatBackend,
    N: NotificationSink,
{
    backend: Arc<B>,
    notifier: N,
    settings: WidgetSettings,
    state: WidgetState,
    session: Option<ChatSession>,
    store: MessageStore,
    synchronizer: MessageSynchronizer,
    trigger: NotificationTrigger,
    badge: usize,
    heartbeat: PresenceHeartbeat,
    uploads: AttachmentUploadManager,
    gallery: GalleryNavigator,
    scheduler: Scheduler,
    in_flight: FuturesUnordered<LocalBoxFuture<'static, CallResult>>,
    lookup_pending: bool,
    /// Last time handed in by the host; deadlines for loops started by a finished
    /// call are measured from here.
    clock: Instant,
    draft: String,
    banner: Option<String>,
    inline_error: Option<String>,
}

impl<B, N> ChatWidget<B, N>
where
    B: ChatBackend,
    N: NotificationSink,
{
    pub fn new(backend: B, notifier: N, settings: WidgetSettings) -> Self {
        let uploads = AttachmentUploadManager::new(settings.max_upload_bytes);
        Self {
            backend: Arc::new(backend),
            notifier,
            settings,
            state: WidgetState::Closed,
            session: None,
            store: MessageStore::default(),
            synchronizer: MessageSynchronizer::default(),
            trigger: NotificationTrigger::default(),
            badge: 0,
            heartbeat: PresenceHeartbeat::default(),
            uploads,
            gallery: GalleryNavigator::default(),
            scheduler: Scheduler::default(),
            in_flight: FuturesUnordered::new(),
            lookup_pending: false,
            clock: Instant::now(),
            draft: String::new(),
            banner: None,
            inline_error: None,
        }
    }

    pub fn backend(&self) -> &B {
        self.backend.as_ref()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn reference(&self) -> &str {
        &self.settings.reference
    }

    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn badge(&self) -> usize {
        self.badge
    }

    pub fn counterpart(&self) -> PresenceState {
        self.heartbeat.counterpart()
    }

    pub fn pending_upload(&self) -> Option<&PendingUpload> {
        self.uploads.pending()
    }

    pub fn gallery(&self) -> Option<&GalleryView> {
        self.gallery.view()
    }

    /// Text of the last message that failed to send.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn inline_error(&self) -> Option<&str> {
        self.inline_error.as_deref()
    }

    /// Waits for the next call to finish and applies its result.
    ///
    /// Stays pending while nothing is in flight, so it can sit in a `select!` arm.
    pub async fn complete_next(&mut self) -> Option<Notice> {
        let Some(result) = self.in_flight.next().await else {
            return std::future::pending().await;
        };
        self.complete(result)
    }

    /// Applies results until nothing is left in flight, including calls started by
    /// the results themselves.
    pub async fn settle(&mut self) {
        while let Some(result) = self.in_flight.next().await {
            self.complete(result);
        }
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// Host page load: looks up an existing conversation so the badge can update
    /// while the widget is still closed.
    pub fn mount(&mut self, now: Instant) {
        self.clock = now;
        if self.session.is_none() {
            self.start_lookup();
        }
    }

    /// Host page unload: best-effort offline report and no more polling.
    pub fn unmount(&mut self) {
        self.deactivate_foreground();
        self.scheduler.deregister_where(|_| true);
    }

    /// Switches to another tracking reference, discarding the current session.
    pub fn set_reference(&mut self, reference: impl Into<String>, now: Instant) {
        let reference = reference.into();
        if reference == self.settings.reference {
            return;
        }

        self.clock = now;
        self.deactivate_foreground();
        self.scheduler.deregister_where(|_| true);
        self.reset_conversation();
        self.settings.reference = reference;
        tracing::info!(reference = %self.settings.reference, "chat reference changed");

        self.start_lookup();
    }

    pub fn open(&mut self, now: Instant) {
        self.clock = now;
        let Some(next) = self.state.on_event(WidgetEvent::OpenRequested) else {
            return;
        };
        self.enter(next);

        if next != WidgetState::Opening {
            self.activate_foreground();
            return;
        }

        self.trigger = self.trigger.reset();
        self.set_badge(0);
        if self.session.is_some() {
            self.finish_opening();
        } else {
            self.start_lookup();
        }
    }

    pub fn toggle_minimize(&mut self, now: Instant) {
        self.clock = now;
        let Some(next) = self.state.on_event(WidgetEvent::MinimizeToggled) else {
            return;
        };
        self.enter(next);

        if next.is_foreground() {
            self.activate_foreground();
        } else {
            self.deactivate_foreground();
        }
    }

    pub fn close(&mut self) {
        let Some(next) = self.state.on_event(WidgetEvent::CloseRequested) else {
            return;
        };
        self.enter(next);
        self.gallery.close();
        self.deactivate_foreground();
    }

    /// Starts every loop whose period has elapsed.
    pub fn tick(&mut self, now: Instant) {
        self.clock = now;
        for key in self.scheduler.due(now) {
            self.run_task(key);
        }
    }

    /// Sync on demand, in the mode the current state calls for.
    pub fn refresh(&mut self) {
        let mode = if self.state.is_foreground() {
            SyncMode::Foreground
        } else {
            SyncMode::Background
        };
        self.start_fetch(mode);
    }

    /// Validates `text` and starts sending it. Validation failures return at once;
    /// network failures arrive later as `Notice::SendFailed`.
    pub fn send_text(
        &mut self,
        text: impl Into<String>,
        now: Instant,
    ) -> Result<(), SendMessageError> {
        self.clock = now;
        let text = text.into();
        self.inline_error = None;

        if text.trim().is_empty() {
            self.inline_error = Some(SendMessageError::EmptyMessage.to_string());
            return Err(SendMessageError::EmptyMessage);
        }

        self.draft.clear();
        let command = SendMessageCommand {
            reference: self.settings.reference.clone(),
            text: text.clone(),
            sender_name: self.settings.visitor.name.clone(),
        };
        let reference = command.reference.clone();
        let backend = Arc::clone(&self.backend);
        self.start_call(async move {
            let result = send_message(&*backend, command).await;
            CallResult::MessageSent {
                reference,
                text,
                result,
            }
        });
        Ok(())
    }

    /// Sends the draft left behind by a failed send.
    pub fn retry_send(&mut self, now: Instant) -> Result<(), SendMessageError> {
        let draft = std::mem::take(&mut self.draft);
        self.send_text(draft, now)
    }

    pub fn select_attachment(
        &mut self,
        file: SelectedFile,
        allow: AllowList,
    ) -> Result<(), UploadError> {
        self.inline_error = None;
        let conversation_started = self.session.is_some();

        match self.uploads.select_file(file, conversation_started, allow) {
            Ok(pending) => {
                let preview = preview_message(pending);
                self.store.show_local_preview(preview);
                Ok(())
            }
            Err(error) => {
                self.inline_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Starts uploading the pending file. The outcome arrives as a notice.
    pub fn upload_attachment(&mut self, caption: Option<String>) -> Result<(), UploadError> {
        let Some(chat_id) = self.session_id() else {
            return Err(UploadError::NothingPending);
        };

        let (request, on_progress) = self.uploads.begin_send(&self.settings.visitor, caption)?;
        let backend = Arc::clone(&self.backend);
        self.start_call(async move {
            let result = backend
                .send_with_attachment(chat_id, request, on_progress)
                .await;
            CallResult::Uploaded { chat_id, result }
        });
        Ok(())
    }

    pub fn cancel_attachment(&mut self) -> bool {
        let cancelled = self.uploads.cancel();
        if cancelled {
            self.store.clear_local_preview();
        }
        cancelled
    }

    /// Opens the gallery on the `index`-th image of the conversation.
    pub fn open_gallery(&mut self, index: usize) -> Option<&GalleryView> {
        let images = gallery_images(&self.store, self.backend.as_ref());
        let url = images
            .get(index)
            .map(|image| image.url.clone())
            .unwrap_or_default();
        self.gallery.open(images, &url)
    }

    /// Opens the gallery on the image at `url`, or the first image.
    pub fn open_gallery_at(&mut self, url: &str) -> Option<&GalleryView> {
        let images = gallery_images(&self.store, self.backend.as_ref());
        self.gallery.open(images, url)
    }

    pub fn gallery_next(&mut self) {
        self.gallery.next();
    }

    pub fn gallery_prev(&mut self) {
        self.gallery.prev();
    }

    pub fn close_gallery(&mut self) {
        self.gallery.close();
    }

    /// Starts saving the image on screen into the download directory.
    pub fn save_gallery_image(&mut self) -> Result<(), SaveImageError> {
        let image = self
            .gallery
            .current()
            .cloned()
            .ok_or(SaveImageError::NothingDisplayed)?;
        let dir = self.settings.download_dir.clone();
        let backend = Arc::clone(&self.backend);
        self.start_call(async move {
            CallResult::ImageSaved(save_image(&*backend, &image, &dir).await)
        });
        Ok(())
    }

    fn session_id(&self) -> Option<i64> {
        self.session.as_ref().map(|session| session.id)
    }

    fn start_call<F>(&mut self, call: F)
    where
        F: Future<Output = CallResult> + 'static,
    {
        self.in_flight.push(call.boxed_local());
    }

    fn complete(&mut self, result: CallResult) -> Option<Notice> {
        match result {
            CallResult::SessionLookup { reference, result } => {
                self.finish_lookup(reference, result);
                None
            }
            CallResult::MessageSent {
                reference,
                text,
                result,
            } => self.finish_send(reference, text, result),
            CallResult::Fetched {
                mode,
                chat_id,
                ticket,
                result,
            } => {
                self.finish_fetch(mode, chat_id, ticket, result);
                None
            }
            CallResult::MarkedRead { chat_id, result } => {
                self.finish_mark_read(chat_id, result);
                None
            }
            CallResult::PresenceReported {
                chat_id,
                is_online,
                result,
            } => {
                self.heartbeat.record_report(chat_id, is_online, result);
                None
            }
            CallResult::CounterpartPolled { chat_id, result } => {
                if self.session_id() == Some(chat_id) {
                    self.heartbeat.record_poll(chat_id, result);
                }
                None
            }
            CallResult::Uploaded { chat_id, result } => self.finish_upload(chat_id, result),
            CallResult::ImageSaved(Ok(path)) => Some(Notice::ImageSaved(path)),
            CallResult::ImageSaved(Err(error)) => {
                tracing::warn!(code = SAVE_FAILED, error = %error, "gallery image save failed");
                Some(Notice::SaveFailed(error))
            }
        }
    }

    fn enter(&mut self, next: WidgetState) {
        tracing::debug!(
            from = self.state.as_label(),
            to = next.as_label(),
            "widget state changed"
        );
        self.state = next;
    }

    fn set_badge(&mut self, unread: usize) {
        if self.badge != unread {
            self.badge = unread;
            self.notifier.set_badge(unread);
        }
    }

    fn apply_trigger(&mut self, outcome: TriggerOutcome) {
        self.trigger = outcome.next;
        if outcome.play_cue {
            self.notifier.play_cue();
        }
        let badge = if self.state.hides_badge() {
            0
        } else {
            outcome.badge
        };
        self.set_badge(badge);
    }

    fn reset_conversation(&mut self) {
        self.session = None;
        self.store.clear();
        self.synchronizer.reset();
        self.trigger = NotificationTrigger::default();
        self.heartbeat.reset();
        self.uploads.clear();
        self.gallery.close();
        self.lookup_pending = false;
        self.draft.clear();
        self.banner = None;
        self.inline_error = None;
        self.set_badge(0);
    }

    fn start_lookup(&mut self) {
        if self.lookup_pending {
            return;
        }
        self.lookup_pending = true;

        let reference = self.settings.reference.clone();
        let backend = Arc::clone(&self.backend);
        self.start_call(async move {
            let result = find_existing_session(&*backend, &reference).await;
            CallResult::SessionLookup { reference, result }
        });
    }

    fn finish_lookup(
        &mut self,
        reference: String,
        result: Result<Option<ChatSession>, SendMessageError>,
    ) {
        if reference != self.settings.reference {
            tracing::debug!(%reference, "dropping session lookup for a previous reference");
            return;
        }
        self.lookup_pending = false;

        match result {
            Ok(Some(session)) => {
                if self.session.is_none()
                    && self.adopt_session(session)
                    && self.state.is_foreground()
                {
                    self.activate_foreground();
                }
            }
            Ok(None) => tracing::debug!(
                reference = %self.settings.reference,
                "no existing chat session for reference"
            ),
            Err(error) => tracing::warn!(
                code = SESSION_LOOKUP_FAILED,
                reference = %self.settings.reference,
                error = %error,
                "existing chat session lookup failed"
            ),
        }

        if self.state == WidgetState::Opening {
            self.finish_opening();
        }
    }

    fn finish_opening(&mut self) {
        if let Some(open) = self.state.on_event(WidgetEvent::SessionLookupCompleted) {
            self.enter(open);
            self.activate_foreground();
        }
    }

    fn finish_send(
        &mut self,
        reference: String,
        text: String,
        result: Result<ChatSession, SendMessageError>,
    ) -> Option<Notice> {
        if reference != self.settings.reference {
            tracing::debug!(%reference, "dropping send result for a previous reference");
            return None;
        }

        match result {
            Ok(session) => {
                self.banner = None;
                if self.adopt_session(session) && self.state.is_foreground() {
                    self.activate_foreground();
                } else {
                    self.refresh();
                }
                None
            }
            Err(error) => {
                tracing::warn!(code = SEND_FAILED, error = %error, "message send failed");
                self.draft = text;
                self.banner = Some(error.to_string());
                Some(Notice::SendFailed(error))
            }
        }
    }

    fn finish_upload(
        &mut self,
        chat_id: i64,
        result: Result<Message, UploadSourceError>,
    ) -> Option<Notice> {
        if self.session_id() != Some(chat_id) {
            tracing::debug!(chat_id, "dropping upload result for a previous session");
            return None;
        }

        match self.uploads.finish_send(chat_id, result) {
            Ok(_) => {
                self.banner = None;
                self.refresh();
                Some(Notice::AttachmentSent)
            }
            Err(error) => {
                self.banner = Some(error.to_string());
                Some(Notice::UploadFailed(error))
            }
        }
    }

    /// Makes `session` current and starts its background loop. Foreground loops
    /// are left to `activate_foreground`. Returns false if it was already current.
    fn adopt_session(&mut self, session: ChatSession) -> bool {
        if self.session_id() == Some(session.id) {
            return false;
        }

        if let Some(previous) = self.session.take() {
            self.scheduler
                .deregister_where(|key| key.chat_id == previous.id);
        }

        tracing::info!(
            chat_id = session.id,
            reference = %session.reference,
            "chat session adopted"
        );
        self.register(LoopName::BackgroundSync, session.id);
        self.synchronizer.reset();
        self.session = Some(session);
        true
    }

    fn register(&mut self, loop_name: LoopName, chat_id: i64) {
        let period = self.settings.period(loop_name);
        self.scheduler
            .register(TaskKey::new(loop_name, chat_id), period, self.clock);
    }

    fn activate_foreground(&mut self) {
        let Some(chat_id) = self.session_id() else {
            return;
        };

        for loop_name in FOREGROUND_LOOPS {
            self.register(loop_name, chat_id);
        }

        self.start_fetch(SyncMode::Foreground);
        self.start_beat();
        self.start_presence_poll();
    }

    fn deactivate_foreground(&mut self) {
        self.scheduler
            .deregister_where(|key| key.loop_name != LoopName::BackgroundSync);

        let Some(session) = self.session.as_ref() else {
            return;
        };
        let (chat_id, reference) = (session.id, session.reference.clone());
        if self.heartbeat.take_offline_report() {
            self.start_presence_report(chat_id, reference, false);
        }
    }

    fn run_task(&mut self, key: TaskKey) {
        if self.session_id() != Some(key.chat_id) {
            self.scheduler.deregister(key);
            return;
        }

        match key.loop_name {
            LoopName::ForegroundSync => self.start_fetch(SyncMode::Foreground),
            LoopName::BackgroundSync => self.start_fetch(SyncMode::Background),
            LoopName::Heartbeat => self.start_beat(),
            LoopName::PresencePoll => self.start_presence_poll(),
        }
    }

    fn start_fetch(&mut self, mode: SyncMode) {
        let Some(chat_id) = self.session_id() else {
            return;
        };

        let ticket = self.synchronizer.begin();
        let backend = Arc::clone(&self.backend);
        self.start_call(async move {
            let result = fetch_conversation(&*backend, chat_id).await;
            CallResult::Fetched {
                mode,
                chat_id,
                ticket,
                result,
            }
        });
    }

    fn finish_fetch(
        &mut self,
        mode: SyncMode,
        chat_id: i64,
        ticket: FetchTicket,
        result: Result<Vec<Message>, SyncError>,
    ) {
        let fetched = match result {
            Ok(fetched) => fetched,
            Err(error) => {
                tracing::warn!(
                    code = SYNC_FETCH_FAILED,
                    chat_id,
                    error = %error,
                    "conversation fetch failed; retrying on next tick"
                );
                return;
            }
        };

        let Some(session) = self.session.as_mut().filter(|session| session.id == chat_id) else {
            tracing::debug!(chat_id, "dropping conversation snapshot for a previous session");
            return;
        };
        let Some(report) =
            self.synchronizer
                .apply(ticket, session, &mut self.store, fetched, Utc::now())
        else {
            return;
        };

        if mode == SyncMode::Foreground && self.state.is_foreground() {
            self.apply_foreground_report(chat_id, report);
        } else {
            self.apply_background_report(report);
        }
    }

    /// Cue for a freshly arrived support message, then mark everything read.
    fn apply_foreground_report(&mut self, chat_id: i64, report: SyncReport) {
        if let Some(message_id) = report.new_incoming {
            let outcome = self.trigger.observe_incoming(message_id);
            self.apply_trigger(outcome);
        }

        if report.unread > 0 {
            self.start_mark_read(chat_id);
        }
    }

    /// Update the badge. Never marks anything read.
    fn apply_background_report(&mut self, report: SyncReport) {
        let outcome = self
            .trigger
            .observe_unread(report.unread, report.newest_unread);
        self.apply_trigger(outcome);
    }

    fn start_mark_read(&mut self, chat_id: i64) {
        let backend = Arc::clone(&self.backend);
        self.start_call(async move {
            let result = mark_conversation_read(&*backend, chat_id).await;
            CallResult::MarkedRead { chat_id, result }
        });
    }

    fn finish_mark_read(&mut self, chat_id: i64, result: Result<(), SyncError>) {
        if let Err(error) = result {
            tracing::warn!(
                code = MARK_READ_FAILED,
                chat_id,
                error = %error,
                "mark-as-read failed; retrying on next foreground sync"
            );
            return;
        }
        if self.session_id() != Some(chat_id) {
            return;
        }

        self.store.mark_incoming_read(Utc::now());
        self.trigger = self.trigger.reset();
        self.set_badge(0);
    }

    fn start_beat(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let (chat_id, reference) = (session.id, session.reference.clone());
        self.heartbeat.start_beat();
        self.start_presence_report(chat_id, reference, true);
    }

    fn start_presence_report(&mut self, chat_id: i64, reference: String, is_online: bool) {
        let backend = Arc::clone(&self.backend);
        self.start_call(async move {
            let result = backend.set_presence(chat_id, &reference, is_online).await;
            CallResult::PresenceReported {
                chat_id,
                is_online,
                result,
            }
        });
    }

    fn start_presence_poll(&mut self) {
        let Some(chat_id) = self.session_id() else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        self.start_call(async move {
            let result = backend.get_presence(chat_id).await;
            CallResult::CounterpartPolled { chat_id, result }
        });
    }
}

fn preview_message(pending: &PendingUpload) -> Message {
    Message {
        id: LOCAL_PREVIEW_ID,
        sender: SenderRole::Visitor,
        kind: pending.kind(),
        text: None,
        file_info: Some(FileInfo {
            name: pending.file.name.clone(),
            url: pending
                .preview_url
                .clone()
                .unwrap_or_else(|| pending.file.name.clone()),
            size: pending.file.size(),
            mime_type: pending.file.mime_type.clone(),
        }),
        status: DeliveryStatus::Sent,
        created_at: Utc::now(),
        delivered_at: None,
        read_at: None,
        sender_name: None,
        is_anonymous: false,
    }
}
