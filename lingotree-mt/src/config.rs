//! Translation endpoint settings and their persistence
//!
//! The configuration is an explicit value handed to the batch runner. Loading
//! and saving go through a [`ConfigStore`], so binaries use a JSON file while
//! tests and embedders can keep it in memory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::error::{MtError, MtResult};

/// Instruction sent as the system message when the user has not set one
pub const DEFAULT_PROMPT_TEMPLATE: &str =
    "请将以下文本翻译成中文，直接输出翻译之后的内容，不要包含其他多余信息";

pub const DEFAULT_CONCURRENCY: u32 = 3;
pub const MIN_CONCURRENCY: u32 = 1;
pub const MAX_CONCURRENCY: u32 = 10;

/// Names accepted by [`TranslationConfig::set_field`]
pub const CONFIG_FIELDS: [&str; 5] =
    ["endpoint", "apiKey", "model", "promptTemplate", "concurrency"];

/// Settings for the chat-completion endpoint
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationConfig {
    /// Full URL of the chat-completions endpoint; empty disables translation
    pub endpoint: String,
    /// Sent verbatim as a bearer token
    pub api_key: String,
    pub model: String,
    pub prompt_template: String,
    /// Requested number of requests in flight; see
    /// [`effective_concurrency`](Self::effective_concurrency)
    pub concurrency: u32,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            model: String::new(),
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl TranslationConfig {
    /// Batch size actually used, clamped to `[1, 10]`
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(MIN_CONCURRENCY, MAX_CONCURRENCY) as usize
    }

    /// Check that endpoint, key and model are all present
    pub fn validate(&self) -> MtResult<()> {
        let missing: Vec<&str> = [
            ("endpoint", &self.endpoint),
            ("apiKey", &self.api_key),
            ("model", &self.model),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MtError::Config(format!("missing {}", missing.join(", "))))
        }
    }

    /// Update one field by its persisted name
    pub fn set_field(&mut self, field: &str, value: &str) -> MtResult<()> {
        match field {
            "endpoint" => self.endpoint = value.to_string(),
            "apiKey" => self.api_key = value.to_string(),
            "model" => self.model = value.to_string(),
            "promptTemplate" => self.prompt_template = value.to_string(),
            "concurrency" => {
                self.concurrency = value.trim().parse().map_err(|_| {
                    MtError::Config(format!("concurrency must be a number, got '{}'", value))
                })?;
            }
            other => {
                return Err(MtError::Config(format!(
                    "unknown field '{}', expected one of: {}",
                    other,
                    CONFIG_FIELDS.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Apply `LINGOTREE_ENDPOINT`, `LINGOTREE_API_KEY` and `LINGOTREE_MODEL`
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|name| std::env::var(name).ok());
        self
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup("LINGOTREE_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(api_key) = lookup("LINGOTREE_API_KEY") {
            self.api_key = api_key;
        }
        if let Some(model) = lookup("LINGOTREE_MODEL") {
            self.model = model;
        }
    }

    /// Fill missing connection fields so a mock backend passes validation
    pub fn with_mock_placeholders(mut self) -> Self {
        for (slot, placeholder) in [
            (&mut self.endpoint, "mock://local"),
            (&mut self.api_key, "mock"),
            (&mut self.model, "mock"),
        ] {
            if slot.is_empty() {
                *slot = placeholder.to_string();
            }
        }
        self
    }

    /// Copy with the API key replaced, for display
    pub fn masked(&self) -> Self {
        let mut copy = self.clone();
        copy.api_key = mask_secret(&self.api_key);
        copy
    }
}

fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "***".to_string()
    }
}

impl fmt::Debug for TranslationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &mask_secret(&self.api_key))
            .field("model", &self.model)
            .field("prompt_template", &self.prompt_template)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

/// Where the configuration lives between sessions
pub trait ConfigStore: Send + Sync {
    fn load(&self) -> MtResult<TranslationConfig>;

    fn save(&self, config: &TranslationConfig) -> MtResult<()>;
}

/// Load, change and persist in one step
pub fn update_config<S, F>(store: &S, change: F) -> MtResult<TranslationConfig>
where
    S: ConfigStore + ?Sized,
    F: FnOnce(&mut TranslationConfig) -> MtResult<()>,
{
    let mut config = store.load()?;
    change(&mut config)?;
    store.save(&config)?;
    Ok(config)
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/lingotree/config.json` for the current user
    pub fn default_location() -> MtResult<Self> {
        let base = dirs::config_dir().ok_or_else(|| {
            MtError::Config("could not determine the user configuration directory".to_string())
        })?;
        Ok(Self::new(base.join("lingotree").join("config.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> MtResult<TranslationConfig> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No stored config, using defaults");
            return Ok(TranslationConfig::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, config: &TranslationConfig) -> MtResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(config)?)?;
        debug!(path = %self.path.display(), "Saved config");
        Ok(())
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: Mutex<TranslationConfig>,
}

impl MemoryConfigStore {
    pub fn new(config: TranslationConfig) -> Self {
        Self {
            config: Mutex::new(config),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> MtResult<TranslationConfig> {
        Ok(self
            .config
            .lock()
            .map_err(|_| MtError::Config("config store lock poisoned".to_string()))?
            .clone())
    }

    fn save(&self, config: &TranslationConfig) -> MtResult<()> {
        *self
            .config
            .lock()
            .map_err(|_| MtError::Config("config store lock poisoned".to_string()))? =
            config.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> TranslationConfig {
        TranslationConfig {
            endpoint: "https://api.example.com/v1/chat/completions".to_string(),
            api_key: "sk-test".to_string(),
            model: "gpt-4o-mini".to_string(),
            ..TranslationConfig::default()
        }
    }

    // ========== Defaults and Validation ==========

    #[test]
    fn test_defaults() {
        let config = TranslationConfig::default();
        assert!(config.endpoint.is_empty());
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.prompt_template, DEFAULT_PROMPT_TEMPLATE);
    }

    #[test]
    fn test_effective_concurrency_is_clamped() {
        let mut config = TranslationConfig::default();
        config.concurrency = 0;
        assert_eq!(config.effective_concurrency(), 1);
        config.concurrency = 7;
        assert_eq!(config.effective_concurrency(), 7);
        config.concurrency = 250;
        assert_eq!(config.effective_concurrency(), 10);
    }

    #[test]
    fn test_validate_reports_missing_fields() {
        assert!(complete().validate().is_ok());

        let mut config = complete();
        config.endpoint.clear();
        config.model.clear();
        match config.validate() {
            Err(MtError::Config(msg)) => {
                assert!(msg.contains("endpoint"));
                assert!(msg.contains("model"));
                assert!(!msg.contains("apiKey"));
            }
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    // ========== Field Updates ==========

    #[test]
    fn test_validate_only_rejects_empty_values() {
        let config = TranslationConfig {
            endpoint: " ".to_string(),
            ..complete()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mock_placeholders_only_fill_blanks() {
        let config = TranslationConfig {
            model: "real-model".to_string(),
            ..TranslationConfig::default()
        }
        .with_mock_placeholders();

        assert!(config.validate().is_ok());
        assert_eq!(config.endpoint, "mock://local");
        assert_eq!(config.model, "real-model");
        assert_eq!(complete().with_mock_placeholders(), complete());
    }

    #[test]
    fn test_set_field() {
        let mut config = TranslationConfig::default();
        config.set_field("endpoint", "http://localhost/v1").unwrap();
        config.set_field("apiKey", "sk-1").unwrap();
        config.set_field("model", "m").unwrap();
        config.set_field("promptTemplate", "Translate to French").unwrap();
        config.set_field("concurrency", "5").unwrap();

        assert_eq!(config.endpoint, "http://localhost/v1");
        assert_eq!(config.api_key, "sk-1");
        assert_eq!(config.model, "m");
        assert_eq!(config.prompt_template, "Translate to French");
        assert_eq!(config.concurrency, 5);
    }

    #[test]
    fn test_set_field_rejects_bad_input() {
        let mut config = TranslationConfig::default();
        assert!(config.set_field("concurrency", "many").is_err());
        assert!(config.set_field("temperature", "0.3").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = TranslationConfig::default();
        config.apply_overrides(|name| match name {
            "LINGOTREE_API_KEY" => Some("sk-env".to_string()),
            _ => None,
        });
        assert_eq!(config.api_key, "sk-env");
        assert!(config.endpoint.is_empty());
    }

    // ========== Serialization ==========

    #[test]
    fn test_camel_case_persistence() {
        let json = serde_json::to_value(complete()).unwrap();
        assert_eq!(json["apiKey"], "sk-test");
        assert_eq!(json["promptTemplate"], DEFAULT_PROMPT_TEMPLATE);
        assert_eq!(json["concurrency"], 3);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: TranslationConfig = serde_json::from_str(r#"{"model": "m"}"#).unwrap();
        assert_eq!(config.model, "m");
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.prompt_template, DEFAULT_PROMPT_TEMPLATE);
    }

    #[test]
    fn test_debug_masks_api_key() {
        let debug = format!("{:?}", complete());
        assert!(debug.contains("***"));
        assert!(!debug.contains("sk-test"));
        assert_eq!(complete().masked().api_key, "***");
        assert_eq!(TranslationConfig::default().masked().api_key, "");
    }

    // ========== Stores ==========

    #[test]
    fn test_file_store_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("config.json"));
        assert_eq!(store.load().unwrap(), TranslationConfig::default());
    }

    #[test]
    fn test_file_store_round_trip_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("nested").join("config.json"));

        store.save(&complete()).unwrap();
        assert_eq!(store.load().unwrap(), complete());
    }

    #[test]
    fn test_update_config_persists_every_edit() {
        let store = MemoryConfigStore::default();
        update_config(&store, |config| config.set_field("model", "m1")).unwrap();
        update_config(&store, |config| config.set_field("concurrency", "8")).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.model, "m1");
        assert_eq!(loaded.concurrency, 8);
    }

    #[test]
    fn test_update_config_failure_leaves_store_untouched() {
        let store = MemoryConfigStore::new(complete());
        let result = update_config(&store, |config| config.set_field("concurrency", "x"));
        assert!(result.is_err());
        assert_eq!(store.load().unwrap(), complete());
    }
}
