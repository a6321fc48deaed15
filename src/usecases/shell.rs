//! Dispatches host events to the chat widget and phrases the outcome for the user.

use std::{path::Path, time::Instant};

use crate::{
    domain::{
        events::{AppEvent, WidgetCommand},
        gallery::GalleryView,
        upload::AllowList,
    },
    infra::file_picker::read_selected_file,
};

use super::{
    contracts::{ChatBackend, NotificationSink},
    widget::{ChatWidget, Notice},
};

pub const HELP: &str = "commands: open | min | close | send <text> | retry | \
photo <path> | attach <path> | upload [caption] | cancel | gallery <n|url> | next | prev | \
save | shut | dismiss | ref <reference> | show | help | quit";

pub struct WidgetShell<B, N>
where
    B: ChatBackend,
    N: NotificationSink,
{
    widget: ChatWidget<B, N>,
    running: bool,
}

impl<B, N> WidgetShell<B, N>
where
    B: ChatBackend,
    N: NotificationSink,
{
    pub fn new(widget: ChatWidget<B, N>) -> Self {
        Self {
            widget,
            running: true,
        }
    }

    pub fn widget(&self) -> &ChatWidget<B, N> {
        &self.widget
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self, now: Instant) {
        self.widget.mount(now);
    }

    /// Waits for the next network call to finish, phrasing its outcome when the
    /// user should hear about it.
    pub async fn complete_next(&mut self) -> Option<String> {
        let notice = self.widget.complete_next().await?;
        Some(self.describe_notice(notice))
    }

    /// Lets outstanding calls finish, e.g. the offline report after `quit`.
    pub async fn settle(&mut self) {
        self.widget.settle().await;
    }

    /// Applies `event`, returning a line of feedback when there is something to say.
    pub fn handle_event(&mut self, event: AppEvent, now: Instant) -> Option<String> {
        match event {
            AppEvent::Tick => {
                self.widget.tick(now);
                None
            }
            AppEvent::QuitRequested => {
                self.widget.unmount();
                self.running = false;
                None
            }
            AppEvent::HelpRequested => Some(HELP.to_owned()),
            AppEvent::Invalid(input) => Some(format!("unknown command `{input}`; try `help`")),
            AppEvent::Command(command) => self.handle_command(command, now),
        }
    }

    fn handle_command(&mut self, command: WidgetCommand, now: Instant) -> Option<String> {
        match command {
            WidgetCommand::Open => {
                self.widget.open(now);
                None
            }
            WidgetCommand::ToggleMinimize => {
                self.widget.toggle_minimize(now);
                None
            }
            WidgetCommand::Close => {
                self.widget.close();
                None
            }
            WidgetCommand::SendText(text) => self
                .widget
                .send_text(text, now)
                .err()
                .map(|error| error.to_string()),
            WidgetCommand::RetrySend => {
                if self.widget.draft().is_empty() {
                    return Some("nothing to resend".to_owned());
                }
                self.widget
                    .retry_send(now)
                    .err()
                    .map(|error| error.to_string())
            }
            WidgetCommand::AttachPhoto(path) => Some(self.pick(&path, AllowList::Images)),
            WidgetCommand::Attach(path) => Some(self.pick(&path, AllowList::Files)),
            WidgetCommand::UploadAttachment { caption } => self
                .widget
                .upload_attachment(caption)
                .err()
                .map(|error| error.to_string()),
            WidgetCommand::CancelAttachment => Some(
                if self.widget.cancel_attachment() {
                    "attachment discarded"
                } else {
                    "no attachment to discard"
                }
                .to_owned(),
            ),
            WidgetCommand::OpenGallery(index) => Some(
                self.widget
                    .open_gallery(index)
                    .map(describe_gallery)
                    .unwrap_or_else(|| NO_IMAGES.to_owned()),
            ),
            WidgetCommand::OpenGalleryAt(url) => Some(
                self.widget
                    .open_gallery_at(&url)
                    .map(describe_gallery)
                    .unwrap_or_else(|| NO_IMAGES.to_owned()),
            ),
            WidgetCommand::GalleryNext => {
                self.widget.gallery_next();
                self.widget.gallery().map(describe_gallery)
            }
            WidgetCommand::GalleryPrev => {
                self.widget.gallery_prev();
                self.widget.gallery().map(describe_gallery)
            }
            WidgetCommand::SaveGalleryImage => self
                .widget
                .save_gallery_image()
                .err()
                .map(|error| error.to_string()),
            WidgetCommand::CloseGallery => {
                self.widget.close_gallery();
                None
            }
            WidgetCommand::DismissBanner => {
                self.widget.dismiss_banner();
                None
            }
            WidgetCommand::SetReference(reference) => {
                self.widget.set_reference(reference, now);
                Some(format!("tracking {}", self.widget.reference()))
            }
            WidgetCommand::Show => None,
        }
    }

    fn pick(&mut self, path: &Path, allow: AllowList) -> String {
        let file = match read_selected_file(path) {
            Ok(file) => file,
            Err(error) => return error.to_string(),
        };
        let name = file.name.clone();
        match self.widget.select_attachment(file, allow) {
            Ok(()) => format!("{name} ready; `upload [caption]` to send"),
            Err(error) => error.to_string(),
        }
    }

    fn describe_notice(&self, notice: Notice) -> String {
        match notice {
            Notice::AttachmentSent => "attachment sent".to_owned(),
            Notice::UploadFailed(error) => format!("{error}; `upload` retries, `cancel` discards"),
            Notice::SendFailed(error) if error.is_validation() => error.to_string(),
            Notice::SendFailed(error) => {
                format!("{error}; `retry` resends \"{}\"", self.widget.draft())
            }
            Notice::ImageSaved(path) => format!("saved {}", path.display()),
            Notice::SaveFailed(error) => error.to_string(),
        }
    }
}

const NO_IMAGES: &str = "no images in this conversation";

fn describe_gallery(view: &GalleryView) -> String {
    match view.current() {
        Some(image) => format!(
            "image {}/{}: {} <{}>",
            view.current_index + 1,
            view.images.len(),
            image.name,
            image.url
        ),
        None => "gallery is empty".to_owned(),
    }
}
