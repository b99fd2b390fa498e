// User settings

use serde::{Deserialize, Serialize};
use sheetdb_protocol::{Color, HIGHLIGHT};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG: &str = r##"{
    // Grid service endpoint
    "backend.apiBase": "https://sheets.googleapis.com",

    // Seconds before a request to the service is abandoned
    "backend.timeoutSecs": 30,

    // Spreadsheet opened when the credentials file does not name one
    "backend.spreadsheetId": "",

    // Background given to cells written by a sync (#RRGGBB)
    "write.highlightColor": "#FFFF66"
}
"##;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Backend
    #[serde(rename = "backend.apiBase")]
    pub api_base: String,

    #[serde(rename = "backend.timeoutSecs")]
    pub timeout_secs: u64,

    #[serde(rename = "backend.spreadsheetId")]
    pub spreadsheet_id: String,

    // Writes
    #[serde(rename = "write.highlightColor")]
    pub highlight_color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: "https://sheets.googleapis.com".to_string(),
            timeout_secs: 30,
            spreadsheet_id: String::new(),
            highlight_color: "#FFFF66".to_string(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sheetdb");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            create_default_file(&path);
            return Self::default();
        }

        Self::load_from(&path)
    }

    /// Load settings from `path`. Missing or unparsable files give defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => {
                // Strip comments (lines starting with //)
                let cleaned: String = contents
                    .lines()
                    .filter(|line| !line.trim().starts_with("//"))
                    .collect::<Vec<_>>()
                    .join("\n");

                match serde_json::from_str(&cleaned) {
                    Ok(settings) => settings,
                    Err(e) => {
                        log::warn!("Error parsing {}: {}; using default settings", path.display(), e);
                        Self::default()
                    }
                }
            }
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Get the config file path for display/opening
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }

    /// Background for written cells. An unparsable color falls back to the
    /// default highlight.
    pub fn highlight(&self) -> Color {
        match parse_hex_color(&self.highlight_color) {
            Some(color) => color,
            None => {
                log::warn!("Invalid write.highlightColor {:?}, using default", self.highlight_color);
                HIGHLIGHT
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Parse `#RRGGBB` (leading `#` optional).
fn parse_hex_color(text: &str) -> Option<Color> {
    let hex = text.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().map(Color::from_hex)
}

/// Create default settings file with comments
fn create_default_file(path: &Path) {
    // Ensure directory exists
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            log::warn!("Error creating config directory: {}", e);
            return;
        }
    }

    if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
        log::warn!("Error writing default settings.json: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheetdb/settings.json");
        create_default_file(&path);
        assert!(path.exists());
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            "{\n  // custom endpoint\n  \"backend.apiBase\": \"http://localhost:9000\",\n  \"backend.timeoutSecs\": 5\n}\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.api_base, "http://localhost:9000");
        assert_eq!(settings.timeout(), Duration::from_secs(5));
        assert_eq!(settings.highlight_color, "#FFFF66");
    }

    #[test]
    fn test_unparsable_or_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(Settings::load_from(&path), Settings::default());

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/settings.json");
        let settings = Settings {
            spreadsheet_id: "abc".to_string(),
            highlight_color: "#00FF00".to_string(),
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();

        let json = fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"backend.spreadsheetId\": \"abc\""));
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_highlight_parsing() {
        let mut settings = Settings::default();
        assert_eq!(settings.highlight(), HIGHLIGHT);

        settings.highlight_color = "00ff00".to_string();
        assert_eq!(settings.highlight(), Color::from_rgb(0.0, 1.0, 0.0));

        settings.highlight_color = "#12345".to_string();
        assert_eq!(settings.highlight(), HIGHLIGHT);
        settings.highlight_color = "#GG0000".to_string();
        assert_eq!(settings.highlight(), HIGHLIGHT);
    }

    #[test]
    fn test_config_path() {
        let display = Settings::config_path_display();
        assert!(display.contains("sheetdb"));
        assert!(display.ends_with("settings.json"));
    }
}
