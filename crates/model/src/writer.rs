//! Result document output.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::DocumentError;

/// Writes `value` as pretty JSON to `path`, replacing any existing file.
///
/// The data goes to a sibling `.tmp` file first and is renamed into place, so
/// a failed write never leaves a truncated document behind.
pub fn write_document<T>(value: &T, path: &Path) -> Result<(), DocumentError>
where
    T: Serialize + ?Sized,
{
    let data = serde_json::to_string_pretty(value).map_err(DocumentError::Encode)?;

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, data).map_err(|source| DocumentError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    if let Err(source) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(DocumentError::Write {
            path: path.to_path_buf(),
            source,
        });
    }

    tracing::debug!(path = %path.display(), "Wrote document");
    Ok(())
}

/// File name derived from a standard name, e.g. `My Rules` → `my_rules_standard.json`.
pub fn default_output_name(name: &str, suffix: &str) -> PathBuf {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect::<String>()
        .to_lowercase();
    PathBuf::from(format!("{stem}_{suffix}.json"))
}
