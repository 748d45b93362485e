// Application settings
// Loaded from ~/.config/livegrid/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use livegrid_protocol::DEFAULT_SERVER_URL;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Invalid settings: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Server
    #[serde(rename = "server.url")]
    pub server_url: String,

    #[serde(rename = "server.connectTimeoutMs")]
    pub connect_timeout_ms: Option<u64>,  // None = wait for the handshake forever

    #[serde(rename = "server.autoConnect")]
    pub auto_connect: bool,

    // Grid
    #[serde(rename = "grid.rows")]
    pub rows: u32,

    #[serde(rename = "grid.cols")]
    pub cols: u32,

    #[serde(rename = "grid.columnWidth")]
    pub column_width: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Server
            server_url: DEFAULT_SERVER_URL.to_string(),
            connect_timeout_ms: Some(10_000),
            auto_connect: true,
            // Grid
            rows: 20,
            cols: 20,
            column_width: 12,
        }
    }
}

const DEFAULT_FILE: &str = r#"{
    // Websocket address of the calculation server
    "server.url": "ws://127.0.0.1:9123",

    // Give up on a connection attempt after this long (null = never)
    "server.connectTimeoutMs": 10000,

    // Connect as soon as the grid opens
    "server.autoConnect": true,

    // Grid size and terminal column width
    "grid.rows": 20,
    "grid.cols": 20,
    "grid.columnWidth": 12
}
"#;

/// Drop whole-line `//` comments so the file parses as plain JSON.
fn strip_comments(contents: &str) -> String {
    contents
        .lines()
        .filter(|line| !line.trim().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("livegrid");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults.
    /// Writes a commented default file on first run.
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            Self::create_default_file(&path);
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Error loading {}: {}", path.display(), e);
                log::warn!("Using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from a specific file. Missing keys take their defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(&strip_comments(contents))?)
    }

    /// Save settings to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    fn create_default_file(path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(path, DEFAULT_FILE) {
            log::warn!("Error writing default settings.json: {}", e);
        }
    }

    /// Handshake limit, or `None` to wait indefinitely. Zero also means no limit.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.filter(|&ms| ms > 0).map(Duration::from_millis)
    }
}
