//! Global application settings.
//!
//! Defaults merged with an optional JSON file at `~/.candleboard/settings.json`.
//! API keys are usually supplied via the process environment instead (see
//! `market::fetcher`); the settings file entries exist as a fallback.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, RwLock};

const SETTING_FILENAME: &str = "settings.json";
const APP_DIR: &str = ".candleboard";

/// Default settings
fn default_settings() -> HashMap<String, SettingValue> {
    let mut settings = HashMap::new();

    // Market-data endpoint
    settings.insert("server.host".to_string(), SettingValue::String("127.0.0.1".to_string()));
    settings.insert("server.port".to_string(), SettingValue::Int(3777));

    // Chart defaults
    settings.insert("chart.default_symbol".to_string(), SettingValue::String("AAPL".to_string()));
    settings.insert("chart.default_timeframe".to_string(), SettingValue::String("1D".to_string()));
    settings.insert("chart.show_volume".to_string(), SettingValue::Bool(true));

    // Datafeed credentials (environment variables take precedence)
    settings.insert("datafeed.alpha_vantage_key".to_string(), SettingValue::String(String::new()));
    settings.insert("datafeed.twelve_data_key".to_string(), SettingValue::String(String::new()));

    settings
}

/// Setting value types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl SettingValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Global settings container
pub struct Settings {
    settings: RwLock<HashMap<String, SettingValue>>,
}

impl Settings {
    /// Defaults only, no file involved.
    pub fn with_defaults() -> Self {
        Self {
            settings: RwLock::new(default_settings()),
        }
    }

    /// Defaults overlaid with whatever the JSON file at `path` provides.
    pub fn load(path: &Path) -> Self {
        let mut settings = default_settings();

        if let Some(file_settings) = read_settings_file(path) {
            for (key, value) in file_settings {
                settings.insert(key, value);
            }
        }

        Self {
            settings: RwLock::new(settings),
        }
    }

    pub fn get(&self, key: &str) -> Option<SettingValue> {
        self.settings.read().ok()?.get(key).cloned()
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(|s| s.to_string()))
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_int())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    pub fn set(&self, key: impl Into<String>, value: SettingValue) {
        if let Ok(mut settings) = self.settings.write() {
            settings.insert(key.into(), value);
        }
    }
}

/// Path of the settings file inside the user's home directory.
pub fn settings_file_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(APP_DIR).join(SETTING_FILENAME)
}

fn read_settings_file(path: &Path) -> Option<HashMap<String, SettingValue>> {
    if path.exists() {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    } else {
        None
    }
}

/// Global settings instance
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(|| Settings::load(&settings_file_path()));
