//! HTTP adapter for the remote support conversation API.

mod client;
mod wire;

pub use client::HttpChatApi;
