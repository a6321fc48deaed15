use std::{fs, path::Path};

use crate::{domain::upload::SelectedFile, infra::error::AppError};

/// Reads a file from disk the way a browser file picker hands it over: name,
/// MIME type guessed from the extension, and the raw bytes.
pub fn read_selected_file(path: &Path) -> Result<SelectedFile, AppError> {
    let bytes = fs::read(path).map_err(|source| AppError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("attachment")
        .to_owned();

    Ok(SelectedFile {
        mime_type: mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_owned(),
        name,
        bytes,
    })
}
