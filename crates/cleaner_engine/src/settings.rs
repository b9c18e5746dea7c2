use std::path::PathBuf;

use async_trait::async_trait;
use cleaner_core::{resolve_download_subdir, AutoCleanPolicy, DEFAULT_INPUT_SUBDIR};
use cleaner_logging::clean_warn;
use serde::{Deserialize, Serialize};

/// Default folder for cleaned output, relative to the service base directory.
pub const DEFAULT_OUTPUT_SUBDIR: &str = "Gemini-Clean";

const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:17811";
const DEFAULT_DEBOUNCE_MS: u64 = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UiLanguage {
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "en")]
    En,
    #[serde(rename = "zh_CN")]
    ZhCn,
}

/// Persisted configuration. Every field has a default so that a partial
/// settings file overlays onto defaults per-field rather than wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub service_url: String,
    pub input_subdir: String,
    pub output_subdir: String,
    pub delete_originals: bool,
    pub auto_clean: bool,
    pub upload_enabled: bool,
    pub upload_api_url: String,
    pub delete_cleaned_after_upload: bool,
    pub debounce_ms: u64,
    pub ui_language: UiLanguage,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            input_subdir: DEFAULT_INPUT_SUBDIR.to_string(),
            output_subdir: DEFAULT_OUTPUT_SUBDIR.to_string(),
            delete_originals: false,
            auto_clean: true,
            upload_enabled: false,
            upload_api_url: String::new(),
            delete_cleaned_after_upload: false,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            ui_language: UiLanguage::default(),
        }
    }
}

impl Settings {
    /// Input folder with stray separators stripped, never empty.
    pub fn resolved_input_subdir(&self) -> String {
        resolve_download_subdir(Some(&self.input_subdir), DEFAULT_INPUT_SUBDIR)
    }

    /// Output folder with stray separators stripped, never empty.
    pub fn resolved_output_subdir(&self) -> String {
        resolve_download_subdir(Some(&self.output_subdir), DEFAULT_OUTPUT_SUBDIR)
    }

    /// The auto-clean snapshot fed to the pure coordinator with each
    /// download-completion message.
    pub fn auto_clean_policy(&self) -> AutoCleanPolicy {
        AutoCleanPolicy {
            auto_clean: self.auto_clean,
            debounce_ms: self.debounce_ms,
            input_subdir: self.resolved_input_subdir(),
        }
    }
}

/// Read-through settings repository. Every `get` observes current persisted
/// values; nothing is cached across calls, so external writers (the options
/// surface) are always picked up.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Never fails: unreadable or malformed storage degrades to defaults.
    async fn get(&self) -> Settings;
}

/// Settings persisted as a RON file, re-read on every access.
pub struct RonSettingsStore {
    path: PathBuf,
}

impl RonSettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl SettingsStore for RonSettingsStore {
    async fn get(&self) -> Settings {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Settings::default();
            }
            Err(err) => {
                clean_warn!("Failed to read settings from {:?}: {}", self.path, err);
                return Settings::default();
            }
        };

        match ron::from_str(&content) {
            Ok(settings) => settings,
            Err(err) => {
                clean_warn!("Failed to parse settings from {:?}: {}", self.path, err);
                Settings::default()
            }
        }
    }
}
