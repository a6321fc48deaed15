use anyhow::Result;
use async_trait::async_trait;

use crate::domain::events::AppEvent;

use super::{
    gallery::{AttachmentDownloader, AttachmentUrlResolver},
    presence::PresenceBackend,
    send_message::ConversationStarter,
    sync_messages::ConversationSource,
    upload_attachment::AttachmentUploader,
};

/// Everything the widget needs from the remote conversation API. Calls run as
/// owned futures alongside the widget, hence `'static`.
pub trait ChatBackend:
    'static
    + ConversationStarter
    + ConversationSource
    + AttachmentUploader
    + PresenceBackend
    + AttachmentDownloader
    + AttachmentUrlResolver
{
}

impl<T> ChatBackend for T where
    T: 'static
        + ConversationStarter
        + ConversationSource
        + AttachmentUploader
        + PresenceBackend
        + AttachmentDownloader
        + AttachmentUrlResolver
{
}

/// Where audible cues and the unread badge go.
pub trait NotificationSink {
    fn play_cue(&self);
    fn set_badge(&self, unread: usize);
}

#[async_trait]
pub trait AppEventSource {
    async fn next_event(&mut self) -> Result<Option<AppEvent>>;
}
