use std::path::Path;

use crate::{
    chat_api::HttpChatApi,
    infra::{
        self, config::FileConfigAdapter, contracts::ConfigAdapter, error::AppError,
        storage_layout::StorageLayout,
    },
    usecases::context::AppContext,
};

/// Loads config, applies the command-line reference override and starts logging.
pub fn bootstrap(
    config_path: Option<&Path>,
    reference: Option<&str>,
) -> Result<AppContext, AppError> {
    let mut context = build_context(&FileConfigAdapter::new(config_path), reference)?;
    let guard = infra::logging::init(&context.config.logging)?;
    context.hold_log_guard(guard);

    tracing::debug!(
        base_url = %context.api.base_url(),
        reference = %context.config.chat.reference,
        "application context ready"
    );
    Ok(context)
}

fn build_context(
    config_adapter: &dyn ConfigAdapter,
    reference: Option<&str>,
) -> Result<AppContext, AppError> {
    let mut config = config_adapter.load()?;
    if let Some(reference) = reference {
        config.chat.reference = reference.to_owned();
    }

    let api = HttpChatApi::new(&config.api)?;
    let storage = StorageLayout::resolve(config.chat.download_dir.clone())?;

    Ok(AppContext::new(config, api, storage))
}
