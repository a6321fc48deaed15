use crate::{
    domain::{message::Message, upload::UploadState, widget_state::WidgetState},
    usecases::{
        contracts::{ChatBackend, NotificationSink},
        widget::ChatWidget,
    },
};

/// One-line summary of the widget; printed whenever it changes.
pub fn status_line<B, N>(widget: &ChatWidget<B, N>) -> String
where
    B: ChatBackend,
    N: NotificationSink,
{
    let mut line = format!("[{}] {}", widget.state().as_label(), widget.reference());

    if widget.state() == WidgetState::Open {
        line.push_str(&format!(" | support {}", widget.counterpart().as_label()));
    }
    if widget.badge() > 0 {
        line.push_str(&format!(" | {} unread", widget.badge()));
    }
    if let Some(pending) = widget.pending_upload() {
        let state = match pending.state {
            UploadState::Idle => "ready".to_owned(),
            UploadState::Uploading => format!("{}%", pending.progress.get()),
            UploadState::Failed => "failed".to_owned(),
        };
        line.push_str(&format!(" | {} {state}", pending.file.name));
    }
    if let Some(banner) = widget.banner() {
        line.push_str(&format!(" | ! {banner}"));
    }

    line
}

pub fn message_line(message: &Message) -> String {
    let mut line = format!(
        "{} {}: {}",
        message.created_at.format("%H:%M"),
        message.display_sender(),
        message.display_content()
    );
    if !message.is_unread_incoming() {
        line.push_str(&format!(" ({})", message.status.as_label()));
    }
    line
}

/// The conversation as shown in the open widget, local preview last.
pub fn conversation_lines<B, N>(widget: &ChatWidget<B, N>) -> Vec<String>
where
    B: ChatBackend,
    N: NotificationSink,
{
    let store = widget.store();
    if store.is_empty() && store.local_preview().is_none() {
        return vec!["(no messages yet; `send <text>` starts the conversation)".to_owned()];
    }

    let mut lines: Vec<String> = store.messages().iter().map(message_line).collect();
    if let Some(preview) = store.local_preview() {
        lines.push(format!("{} [not sent yet]", message_line(preview)));
    }
    if let Some(error) = widget.inline_error() {
        lines.push(format!("! {error}"));
    }
    lines
}
