//! Use case layer: application workflows and orchestration.

pub mod bootstrap;
pub mod context;
pub mod contracts;
pub mod gallery;
pub mod presence;
pub mod scheduler;
pub mod send_message;
pub mod shell;
pub mod sync_messages;
pub mod upload_attachment;
pub mod widget;
