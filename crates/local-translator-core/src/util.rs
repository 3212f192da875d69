//! Utility functions shared across the crate.

use std::path::PathBuf;

/// Get the user's config directory following XDG conventions.
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

/// Get the user's data directory following XDG conventions.
///
/// Returns `$XDG_DATA_HOME` if set, otherwise `$HOME/.local/share`.
pub fn data_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share"))
        })
}

/// Get the default preference database path.
pub fn preferences_path() -> PathBuf {
    data_dir()
        .unwrap_or_else(|| PathBuf::from(".local"))
        .join("local-translator")
        .join("preferences")
}

/// Forget every stored preference.
///
/// Returns the number of entries cleared, or an error message.
pub fn clear_preferences(path: Option<PathBuf>) -> Result<usize, String> {
    let path = path.unwrap_or_else(preferences_path);

    if !path.exists() {
        return Ok(0);
    }

    let db = sled::open(&path).map_err(|e| format!("Failed to open preferences: {e}"))?;

    let count = db.len();
    db.clear().map_err(|e| format!("Failed to clear preferences: {e}"))?;
    db.flush().map_err(|e| format!("Failed to flush preferences: {e}"))?;

    Ok(count)
}

/// Count characters the way the input limit is expressed (Unicode scalar values).
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}
