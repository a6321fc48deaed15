use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Tick,
    QuitRequested,
    HelpRequested,
    /// Input that did not parse as a command.
    Invalid(String),
    Command(WidgetCommand),
}

/// User intents addressed to the chat widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetCommand {
    Open,
    ToggleMinimize,
    Close,
    SendText(String),
    /// Resend the text of the last failed send.
    RetrySend,
    /// Pick an image to attach.
    AttachPhoto(PathBuf),
    /// Pick a document to attach.
    Attach(PathBuf),
    UploadAttachment { caption: Option<String> },
    CancelAttachment,
    OpenGallery(usize),
    OpenGalleryAt(String),
    GalleryNext,
    GalleryPrev,
    SaveGalleryImage,
    CloseGallery,
    DismissBanner,
    SetReference(String),
    Show,
}
