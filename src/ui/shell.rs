use std::{
    io::Write,
    time::{Duration, Instant},
};

use anyhow::Result;

use crate::{
    domain::{
        events::{AppEvent, WidgetCommand},
        widget_state::WidgetState,
    },
    usecases::{
        context::AppContext,
        contracts::{AppEventSource, ChatBackend, NotificationSink},
        shell::{WidgetShell, HELP},
    },
};

use super::view;

/// How long `quit` waits for outstanding calls such as the offline report.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

pub async fn start<B, N>(
    context: &AppContext,
    event_source: &mut dyn AppEventSource,
    shell: &mut WidgetShell<B, N>,
) -> Result<()>
where
    B: ChatBackend,
    N: NotificationSink,
{
    tracing::info!(
        log_level = %context.config.logging.level,
        base_url = %context.api.base_url(),
        reference = %context.config.chat.reference,
        "starting chat widget shell"
    );

    let mut stdout = std::io::stdout();
    writeln!(stdout, "{HELP}")?;
    run(event_source, shell, &mut stdout).await
}

/// Host loop: applies events and finished network calls until the shell stops,
/// echoing feedback, status changes and newly arrived messages to `out`.
pub async fn run<B, N, W>(
    event_source: &mut dyn AppEventSource,
    shell: &mut WidgetShell<B, N>,
    out: &mut W,
) -> Result<()>
where
    B: ChatBackend,
    N: NotificationSink,
    W: Write,
{
    shell.start(Instant::now());
    let mut last_status = view::status_line(shell.widget());
    writeln!(out, "{last_status}")?;
    let mut printed = 0;

    while shell.is_running() {
        let mut show_all = false;
        let feedback = tokio::select! {
            biased;
            notice = shell.complete_next() => notice,
            event = event_source.next_event() => {
                let Some(event) = event? else {
                    continue;
                };
                show_all = event == AppEvent::Command(WidgetCommand::Show);
                shell.handle_event(event, Instant::now())
            }
        };

        if let Some(feedback) = feedback {
            writeln!(out, "{feedback}")?;
        }

        let widget = shell.widget();
        let status = view::status_line(widget);
        if status != last_status {
            writeln!(out, "{status}")?;
            last_status = status;
        }

        let messages = widget.store().messages();
        if printed > messages.len() {
            printed = 0;
        }
        if show_all {
            for line in view::conversation_lines(widget) {
                writeln!(out, "  {line}")?;
            }
            printed = messages.len();
        } else if widget.state() == WidgetState::Open {
            for message in &messages[printed..] {
                writeln!(out, "  {}", view::message_line(message))?;
            }
            printed = messages.len();
        }
        out.flush()?;
    }

    if tokio::time::timeout(SHUTDOWN_GRACE, shell.settle())
        .await
        .is_err()
    {
        tracing::warn!(
            code = "CHAT_SHUTDOWN_CALLS_ABANDONED",
            "network calls still running at shutdown were abandoned"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::upload::DEFAULT_MAX_UPLOAD_BYTES,
        test_support::{RecordingNotifier, StubChatBackend},
        ui::event_source::MockEventSource,
        usecases::{
            upload_attachment::UploaderIdentity,
            widget::{ChatWidget, WidgetSettings},
        },
    };

    fn shell(backend: StubChatBackend) -> WidgetShell<StubChatBackend, RecordingNotifier> {
        let settings = WidgetSettings {
            reference: "REF-1".to_owned(),
            visitor: UploaderIdentity {
                name: "Visitor".to_owned(),
                email: None,
            },
            foreground_sync_every: Duration::from_secs(5),
            background_sync_every: Duration::from_secs(10),
            heartbeat_every: Duration::from_secs(30),
            presence_poll_every: Duration::from_secs(30),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            download_dir: std::env::temp_dir(),
        };
        WidgetShell::new(ChatWidget::new(backend, RecordingNotifier::default(), settings))
    }

    #[tokio::test]
    async fn open_and_send_echo_the_conversation() {
        let mut source = MockEventSource::from(vec![
            AppEvent::Command(WidgetCommand::Open),
            AppEvent::Command(WidgetCommand::SendText("hello".to_owned())),
            AppEvent::QuitRequested,
        ]);
        let mut shell = shell(StubChatBackend::default().assigning_chat_id(42));
        let mut out = Vec::new();

        run(&mut source, &mut shell, &mut out)
            .await
            .expect("loop should finish");

        let output = String::from_utf8(out).expect("utf-8 output");
        assert!(output.starts_with("[closed] REF-1\n"), "{output}");
        assert!(output.contains("[open] REF-1"), "{output}");
        assert!(output.contains("Visitor: hello (sent)"), "{output}");
        assert!(!shell.is_running());
        assert_eq!(shell.widget().backend().presence_reports(), vec![(42, true), (42, false)]);
    }

    #[tokio::test]
    async fn show_prints_whole_conversation_while_closed() {
        let mut source = MockEventSource::from(vec![
            AppEvent::Command(WidgetCommand::SendText("hi".to_owned())),
            AppEvent::Command(WidgetCommand::Show),
        ]);
        let mut shell = shell(StubChatBackend::default());
        let mut out = Vec::new();

        run(&mut source, &mut shell, &mut out)
            .await
            .expect("loop should finish");

        let output = String::from_utf8(out).expect("utf-8 output");
        assert_eq!(output.matches("Visitor: hi (sent)").count(), 1, "{output}");
    }
}
