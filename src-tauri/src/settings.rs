//! Settings management module for QrScan
//! Persists application settings to JSON file

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::history_manager::DEFAULT_CAPACITY;
use crate::qr_service::QrImageSettings;

/// Cosmetic delays of the view, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    pub generate_delay_ms: u64,
    pub reset_delay_ms: u64,
    pub copy_feedback_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            generate_delay_ms: 600,
            reset_delay_ms: 300,
            copy_feedback_ms: 2000,
        }
    }
}

impl TimingSettings {
    pub fn generate_delay(&self) -> Duration {
        Duration::from_millis(self.generate_delay_ms)
    }

    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }

    pub fn copy_feedback(&self) -> Duration {
        Duration::from_millis(self.copy_feedback_ms)
    }
}

/// History list settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub capacity: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Main application settings container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppSettings {
    pub qr: QrImageSettings,
    pub timings: TimingSettings,
    pub history: HistorySettings,
    /// Where downloaded images go. Falls back to the OS download directory.
    pub download_dir: Option<PathBuf>,
}

impl AppSettings {
    pub fn resolved_download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(get_settings_dir)
    }
}

/// Get the settings directory path
pub fn get_settings_dir() -> PathBuf {
    let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config_dir.join("QrScan")
}

/// Get the settings file path
pub fn get_settings_file() -> PathBuf {
    get_settings_dir().join("settings.json")
}

/// Load settings from file
pub fn load_settings() -> AppSettings {
    load_settings_from(&get_settings_file())
}

pub fn load_settings_from(path: &Path) -> AppSettings {
    if !path.exists() {
        return AppSettings::default();
    }
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                app_warn!("[Settings] Failed to parse {}: {}. Using defaults.", path.display(), e);
                AppSettings::default()
            }
        },
        Err(e) => {
            app_warn!("[Settings] Failed to read {}: {}. Using defaults.", path.display(), e);
            AppSettings::default()
        }
    }
}

/// Save settings to file
pub fn save_settings(settings: &AppSettings) -> Result<(), String> {
    save_settings_to(&get_settings_file(), settings)
}

pub fn save_settings_to(path: &Path, settings: &AppSettings) -> Result<(), String> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| e.to_string())?;
    }

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| e.to_string())?;

    fs::write(path, content).map_err(|e| e.to_string())
}
