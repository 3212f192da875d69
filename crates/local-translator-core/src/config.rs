use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Maximum number of characters accepted as translation input
pub const MAX_INPUT_CHARACTERS: usize = 6400;
/// Default Ollama API base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:11434/api";
/// Model listing timeout in milliseconds
pub const DIRECTORY_TIMEOUT_MS: u64 = 10_000;
/// Translation request timeout in milliseconds (generation is slower than listing)
pub const TRANSLATION_TIMEOUT_MS: u64 = 30_000;
/// Quiet period before an auto-detect translation fires
pub const DEBOUNCE_MS: u64 = 750;
/// How long a toast stays on screen
pub const TOAST_MS: u64 = 5_000;

/// Prefix for environment overrides, e.g. `LOCAL_TRANSLATOR__SERVER__API_BASE`
const ENV_PREFIX: &str = "LOCAL_TRANSLATOR";

/// Connection settings for the Ollama server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_directory_timeout_ms")]
    pub directory_timeout_ms: u64,
    #[serde(default = "default_translation_timeout_ms")]
    pub translation_timeout_ms: u64,
}

impl ServerConfig {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            ..Default::default()
        }
    }

    pub const fn directory_timeout(&self) -> Duration {
        Duration::from_millis(self.directory_timeout_ms)
    }

    pub const fn translation_timeout(&self) -> Duration {
        Duration::from_millis(self.translation_timeout_ms)
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

const fn default_directory_timeout_ms() -> u64 {
    DIRECTORY_TIMEOUT_MS
}

const fn default_translation_timeout_ms() -> u64 {
    TRANSLATION_TIMEOUT_MS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            directory_timeout_ms: DIRECTORY_TIMEOUT_MS,
            translation_timeout_ms: TRANSLATION_TIMEOUT_MS,
        }
    }
}

/// Generation parameters sent with every chat request.
///
/// Low temperature and a fixed seed keep translations reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_seed")]
    pub seed: i64,
}

const fn default_temperature() -> f32 {
    0.1
}

const fn default_seed() -> i64 {
    42
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            seed: default_seed(),
        }
    }
}

/// Request coordinator tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_max_input_characters")]
    pub max_input_characters: usize,
}

impl TranslationConfig {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

const fn default_debounce_ms() -> u64 {
    DEBOUNCE_MS
}

const fn default_max_input_characters() -> usize {
    MAX_INPUT_CHARACTERS
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEBOUNCE_MS,
            max_input_characters: MAX_INPUT_CHARACTERS,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enable the translation memo
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum cached translations
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,

    /// Entry TTL in seconds (0 = no expiry)
    #[serde(default)]
    pub ttl_seconds: u64,
}

const fn default_true() -> bool {
    true
}

const fn default_max_entries() -> u64 {
    500
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: default_max_entries(),
            ttl_seconds: 0,
        }
    }
}

/// Where user choices are persisted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferencesConfig {
    /// Preference database directory (defaults to $XDG_DATA_HOME/local-translator/preferences)
    pub path: Option<PathBuf>,
}

/// Presentation timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_toast_ms")]
    pub toast_ms: u64,
}

const fn default_toast_ms() -> u64 {
    TOAST_MS
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { toast_ms: TOAST_MS }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ollama server connection
    #[serde(default)]
    pub server: ServerConfig,

    /// Generation parameters
    #[serde(default)]
    pub generation: GenerationOptions,

    /// Coordinator tuning
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Translation cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Preference persistence
    #[serde(default)]
    pub preferences: PreferencesConfig,

    /// UI timing
    #[serde(default)]
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::ConfigLoad(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations (~/.config/local-translator/config.toml, ./config.toml)
    /// layered with `LOCAL_TRANSLATOR__*` environment variables.
    pub fn load() -> Self {
        match Self::load_layered(&default_config_files()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load configuration, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Merge the given files (later files win) and the environment.
    pub fn load_layered(files: &[PathBuf]) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        for file in files.iter().filter(|f| f.exists()) {
            tracing::debug!("Loading config from {}", file.display());
            builder = builder.add_source(
                ::config::File::from(file.clone()).format(::config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .map_err(|e| Error::ConfigLoad(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the coordinator or clients cannot work with.
    pub fn validate(&self) -> Result<()> {
        let base = &self.server.api_base;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(Error::ConfigInvalid {
                field: "server.api_base".to_string(),
                reason: format!("'{base}' is not an http(s) URL"),
            });
        }
        if self.server.directory_timeout_ms == 0 || self.server.translation_timeout_ms == 0 {
            return Err(Error::ConfigInvalid {
                field: "server.*_timeout_ms".to_string(),
                reason: "timeouts must be greater than zero".to_string(),
            });
        }
        if self.translation.max_input_characters == 0 {
            return Err(Error::ConfigInvalid {
                field: "translation.max_input_characters".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(Error::ConfigInvalid {
                field: "generation.temperature".to_string(),
                reason: "must be between 0.0 and 2.0".to_string(),
            });
        }
        Ok(())
    }
}

fn default_config_files() -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Some(dir) = crate::util::config_dir() {
        files.push(dir.join("local-translator").join("config.toml"));
    }
    files.push(PathBuf::from("config.toml"));
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_constants() {
        let config = AppConfig::default();
        assert_eq!(config.server.api_base, "http://localhost:11434/api");
        assert_eq!(config.server.directory_timeout(), Duration::from_secs(10));
        assert_eq!(config.server.translation_timeout(), Duration::from_secs(30));
        assert_eq!(config.translation.debounce(), Duration::from_millis(750));
        assert_eq!(config.translation.max_input_characters, 6400);
        assert_eq!(config.ui.toast_ms, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            api_base = "http://gpu-box:11434/api"

            [translation]
            debounce_ms = 300
            "#,
        )
        .unwrap();

        assert_eq!(config.server.api_base, "http://gpu-box:11434/api");
        assert_eq!(config.server.translation_timeout_ms, TRANSLATION_TIMEOUT_MS);
        assert_eq!(config.translation.debounce_ms, 300);
        assert_eq!(config.translation.max_input_characters, MAX_INPUT_CHARACTERS);
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.server.api_base = "localhost:11434".to_string();
        assert!(matches!(config.validate(), Err(Error::ConfigInvalid { .. })));

        let mut config = AppConfig::default();
        config.translation.max_input_characters = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_and_layering() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.toml");
        let local = dir.path().join("local.toml");
        std::fs::write(&base, "[cache]\nenabled = false\nmax_entries = 10\n").unwrap();
        std::fs::write(&local, "[cache]\nmax_entries = 20\n").unwrap();

        let single = AppConfig::from_file(&base).unwrap();
        assert!(!single.cache.enabled);

        let layered = AppConfig::load_layered(&[base, local, dir.path().join("missing.toml")])
            .unwrap();
        assert!(!layered.cache.enabled);
        assert_eq!(layered.cache.max_entries, 20);
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[server\napi_base = ").unwrap();
        assert!(matches!(AppConfig::from_file(&path), Err(Error::ConfigLoad(_))));
    }
}
