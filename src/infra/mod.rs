//! Infrastructure layer: adapters for config, logging, and local storage.

pub mod config;
pub mod contracts;
pub mod error;
pub mod file_picker;
pub mod logging;
pub mod storage_layout;
pub mod stubs;
