use crate::error::{store_error, BotResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::warn;

/// Load a JSON mapping, treating a missing or unreadable file as empty state
pub fn load_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return T::default(),
        Err(e) => {
            warn!("Failed to read {}, starting empty: {}", path.display(), e);
            return T::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            warn!("Corrupt state file {}, starting empty: {}", path.display(), e);
            T::default()
        }
    }
}

/// Rewrite the whole file with pretty-printed JSON
pub fn save<T: Serialize>(path: &Path, value: &T) -> BotResult<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    let json = serde_json::to_string_pretty(value)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)
        .map_err(|e| store_error(&format!("Failed to replace {}: {}", path.display(), e)))?;

    Ok(())
}
