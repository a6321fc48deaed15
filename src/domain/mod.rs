//! Domain layer: conversation entities and the pure rules over them.

pub mod events;
pub mod gallery;
pub mod message;
pub mod message_store;
pub mod notification;
pub mod presence;
pub mod session;
pub mod upload;
pub mod widget_state;

