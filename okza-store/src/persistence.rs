//! File persistence helpers.
//!
//! Default locations for Okza's files, plus JSON load/save with atomic
//! writes and owner-only permissions.

use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::StoreError;

/// Directory name used under the platform config, cache, and data dirs.
pub const APP_DIR: &str = "okza";

/// File name of the search history ledger.
pub const HISTORY_FILE: &str = "previous_results.csv";

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the default configuration directory.
///
/// - Linux: `~/.config/okza`
/// - macOS: `~/Library/Application Support/okza`
/// - Windows: `%APPDATA%\okza`
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Returns the default cache directory.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Returns the default data directory.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.json")
}

/// Returns the default history ledger path.
pub fn default_history_path() -> PathBuf {
    default_data_dir().join(HISTORY_FILE)
}

/// Returns the default job receipt path.
pub fn default_receipt_path() -> PathBuf {
    default_cache_dir().join("last_job.json")
}

// ============================================================================
// Security: File Permissions
// ============================================================================

/// Sets owner-only file permissions (0o600) on Unix systems.
#[cfg(unix)]
async fn set_restrictive_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = tokio::fs::metadata(path).await?;
    let mut perms = metadata.permissions();
    perms.set_mode(0o600);
    tokio::fs::set_permissions(path, perms).await?;

    debug!(path = %path.display(), mode = "0600", "Set restrictive permissions");
    Ok(())
}

/// No-op for non-Unix systems.
#[cfg(not(unix))]
async fn set_restrictive_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ============================================================================
// File Operations
// ============================================================================

async fn create_parent_dirs(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!(path = %parent.display(), "Creating directory");
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// Saves data to a JSON file.
///
/// Creates parent directories if they don't exist, writes atomically
/// (via temp file + rename), and sets owner-only permissions on Unix.
///
/// # Errors
///
/// Returns an error if serialization or any filesystem step fails.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Saving JSON file");

    create_parent_dirs(path).await?;

    let json = serde_json::to_string_pretty(data)?;

    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, &json).await?;
    tokio::fs::rename(&temp_path, path).await?;

    set_restrictive_permissions(path).await?;

    debug!(path = %path.display(), "JSON file saved");
    Ok(())
}

/// Loads data from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not decode.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    debug!(path = %path.display(), "Loading JSON file");

    let content = tokio::fs::read_to_string(path).await?;
    let data = serde_json::from_str(&content)?;

    Ok(data)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_default_paths() {
        assert!(default_config_path().ends_with("okza/config.json"));
        assert!(default_history_path().ends_with("okza/previous_results.csv"));
        assert!(default_receipt_path().ends_with("okza/last_job.json"));
    }

    #[tokio::test]
    async fn test_save_and_load_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("sample.json");
        let sample = Sample {
            name: "casque".into(),
            count: 3,
        };

        save_json(&path, &sample).await.unwrap();
        let loaded: Sample = load_json(&path).await.unwrap();

        assert_eq!(loaded, sample);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_load_json_missing_and_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.json");
        let err = load_json::<Sample>(&missing).await.unwrap_err();
        assert!(err.is_not_found());

        let corrupt = temp_dir.path().join("corrupt.json");
        tokio::fs::write(&corrupt, "{ not json").await.unwrap();
        let err = load_json::<Sample>(&corrupt).await.unwrap_err();
        assert!(!err.is_not_found());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sample.json");
        save_json(&path, &Sample::default()).await.unwrap();

        let mode = tokio::fs::metadata(&path).await.unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
