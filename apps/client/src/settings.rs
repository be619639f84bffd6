//! User preferences, persisted as one JSON blob under [`SETTINGS_KEY`].

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::StorageError;
use crate::storage::{Persistence, SETTINGS_KEY};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub api_url: String,
    pub openai_api_key: String,
    pub default_model: String,
    pub theme: Theme,
    pub auto_save: bool,
    pub notifications: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            openai_api_key: String::new(),
            default_model: DEFAULT_MODEL.to_string(),
            theme: Theme::Light,
            auto_save: true,
            notifications: true,
        }
    }
}

/// Partial update. Also the shape used to decode the persisted blob, so a
/// blob written by an older client with fewer fields still merges cleanly.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_save: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<bool>,
}

impl Settings {
    pub fn merged(mut self, patch: SettingsPatch) -> Self {
        if let Some(v) = patch.api_url {
            self.api_url = v;
        }
        if let Some(v) = patch.openai_api_key {
            self.openai_api_key = v;
        }
        if let Some(v) = patch.default_model {
            self.default_model = v;
        }
        if let Some(v) = patch.theme {
            self.theme = v;
        }
        if let Some(v) = patch.auto_save {
            self.auto_save = v;
        }
        if let Some(v) = patch.notifications {
            self.notifications = v;
        }
        self
    }
}

pub struct SettingsStore {
    defaults: Settings,
    current: RwLock<Settings>,
    persistence: Persistence,
}

impl SettingsStore {
    pub fn new(defaults: Settings, persistence: Persistence) -> Self {
        Self {
            current: RwLock::new(defaults.clone()),
            defaults,
            persistence,
        }
    }

    pub fn get(&self) -> Settings {
        self.current.read().clone()
    }

    /// Reads the persisted blob and merges it over the defaults. A missing or
    /// corrupt blob leaves the defaults in effect.
    pub fn load(&self) -> Settings {
        let loaded = match self.persistence.read(SETTINGS_KEY) {
            None => {
                debug!("No saved settings; using defaults");
                self.defaults.clone()
            }
            Some(raw) => match serde_json::from_str::<SettingsPatch>(&raw) {
                Ok(patch) => {
                    info!("Loaded saved settings");
                    self.defaults.clone().merged(patch)
                }
                Err(e) => {
                    self.persistence
                        .report_corrupt(SETTINGS_KEY, &StorageError::Corrupt(e));
                    self.defaults.clone()
                }
            },
        };
        *self.current.write() = loaded.clone();
        loaded
    }

    /// Merges `patch` into the current settings and persists the full result.
    pub fn update(&self, patch: SettingsPatch) -> Settings {
        let merged = {
            let mut current = self.current.write();
            *current = current.clone().merged(patch);
            current.clone()
        };
        match serde_json::to_string(&merged) {
            Ok(raw) => self.persistence.write(SETTINGS_KEY, &raw),
            Err(e) => self
                .persistence
                .report_corrupt(SETTINGS_KEY, &StorageError::Corrupt(e)),
        }
        merged
    }
}
