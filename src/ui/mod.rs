//! UI layer: a line-oriented terminal host for the chat widget.

mod event_source;
mod notifier;
pub mod shell;
mod view;

pub(crate) use event_source::StdinEventSource;
pub(crate) use notifier::TerminalNotifier;
