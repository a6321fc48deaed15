use std::time::Instant;

use anyhow::Result;

use crate::{
    cli::{Cli, Command},
    infra::stubs::SilentNotifier,
    ui::{self, StdinEventSource, TerminalNotifier},
    usecases::{
        bootstrap,
        contracts::ChatBackend,
        shell::WidgetShell,
        widget::{ChatWidget, WidgetSettings},
    },
};

pub async fn run(cli: Cli) -> Result<()> {
    let context = bootstrap::bootstrap(cli.config.as_deref(), cli.reference.as_deref())?;

    match cli.command_or_default() {
        Command::Run => {
            let widget = ChatWidget::new(
                context.api.clone(),
                TerminalNotifier,
                context.widget_settings(),
            );
            let mut shell = WidgetShell::new(widget);
            let mut source = StdinEventSource::new(context.tick_interval());
            ui::shell::start(&context, &mut source, &mut shell).await?;
        }
        Command::Status => {
            let report = status_report(context.api.clone(), context.widget_settings()).await;
            for line in report.lines() {
                println!("{line}");
            }
        }
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StatusReport {
    reference: String,
    chat_id: Option<i64>,
    messages: usize,
    unread: usize,
}

impl StatusReport {
    fn lines(&self) -> Vec<String> {
        match self.chat_id {
            Some(chat_id) => vec![
                format!("reference: {} (chat {chat_id})", self.reference),
                format!("messages: {}", self.messages),
                format!("unread from support: {}", self.unread),
            ],
            None => vec![format!(
                "reference: {} (no conversation yet)",
                self.reference
            )],
        }
    }
}

/// One lookup and one background-style sync; nothing is marked read.
async fn status_report<B: ChatBackend>(backend: B, settings: WidgetSettings) -> StatusReport {
    let mut widget = ChatWidget::new(backend, SilentNotifier, settings);
    widget.mount(Instant::now());
    widget.settle().await;
    widget.refresh();
    widget.settle().await;

    let store = widget.store();
    StatusReport {
        reference: widget.reference().to_owned(),
        chat_id: widget.session().map(|session| session.id),
        messages: store.len(),
        unread: store.unread_count(),
    }
}
