//! Credential storage.
//!
//! Reads/writes ~/.config/sheetdb/credentials.json (0600 on Unix).
//! Obtaining the token in the first place is left to the caller.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Access to one spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Bearer token for the grid service
    pub token: String,
    /// API base URL (e.g., "https://sheets.example.com"). Empty means the
    /// one from settings.
    #[serde(default)]
    pub api_base: String,
    /// Spreadsheet the token was issued for. Empty means the one from
    /// settings.
    #[serde(default)]
    pub spreadsheet_id: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>, api_base: impl Into<String>, spreadsheet_id: impl Into<String>) -> Self {
        Self { token: token.into(), api_base: api_base.into(), spreadsheet_id: spreadsheet_id.into() }
    }
}

/// Returns the path to the credentials file.
pub fn credentials_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("sheetdb/credentials.json"))
}

/// Load saved credentials from disk.
/// Returns None if nothing is saved or the file is invalid.
pub fn load_credentials() -> Option<Credentials> {
    load_credentials_from(&credentials_path()?)
}

pub fn load_credentials_from(path: &Path) -> Option<Credentials> {
    let contents = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(creds) => Some(creds),
        Err(e) => {
            log::warn!("Ignoring unreadable credentials file {}: {}", path.display(), e);
            None
        }
    }
}

/// Save credentials to disk.
/// Creates the parent directory if it doesn't exist.
/// Sets 0600 permissions on Unix.
pub fn save_credentials(creds: &Credentials) -> Result<(), String> {
    let path = credentials_path().ok_or("Could not determine config directory")?;
    save_credentials_to(&path, creds)
}

pub fn save_credentials_to(path: &Path, creds: &Credentials) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }

    let contents = serde_json::to_string_pretty(creds)
        .map_err(|e| format!("Failed to serialize credentials: {}", e))?;

    std::fs::write(path, &contents)
        .map_err(|e| format!("Failed to write credentials file: {}", e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions)
            .map_err(|e| format!("Failed to set file permissions: {}", e))?;
    }

    Ok(())
}

/// Delete saved credentials.
pub fn delete_credentials() -> Result<(), String> {
    let Some(path) = credentials_path() else {
        return Ok(());
    };
    delete_credentials_at(&path)
}

pub fn delete_credentials_at(path: &Path) -> Result<(), String> {
    if path.exists() {
        std::fs::remove_file(path)
            .map_err(|e| format!("Failed to delete credentials file: {}", e))?;
    }
    Ok(())
}
