//! Persisted user choices.
//!
//! [`PreferenceStore`] is the raw key-value port; [`Preferences`] is the typed
//! facade the coordinator talks to. Every value is stored JSON-encoded, and
//! reads never fail: missing or unusable data falls back to the defaults.

mod disk;
mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;

use crate::config::PreferencesConfig;
use crate::error::Result;
use crate::language::{DEFAULT_SOURCE_LANG, DEFAULT_TARGET_LANG, Lang};

pub const INPUT_LANGUAGE_KEY: &str = "input-language";
pub const OUTPUT_LANGUAGE_KEY: &str = "output-language";
pub const SELECTED_MODEL_KEY: &str = "selected-model";
pub const FAVORITE_MODEL_KEY: &str = "favorite-model";

/// Key-value storage for string preferences
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// Typed access to the four persisted choices.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// In-memory preferences (nothing persisted).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Open the sled-backed store at the configured or default location.
    pub fn open(config: &PreferencesConfig) -> Result<Self> {
        let path = config
            .path
            .clone()
            .unwrap_or_else(crate::util::preferences_path);
        Ok(Self::new(Arc::new(DiskStore::open(path)?)))
    }

    pub fn source_language(&self) -> Lang {
        self.read::<String>(INPUT_LANGUAGE_KEY)
            .map(Lang::new)
            .filter(|lang| {
                let valid = lang.is_valid_source();
                if !valid {
                    warn!("Ignoring stored source language '{}'", lang);
                }
                valid
            })
            .unwrap_or_else(|| Lang::new(DEFAULT_SOURCE_LANG))
    }

    pub fn target_language(&self) -> Lang {
        self.read::<String>(OUTPUT_LANGUAGE_KEY)
            .map(Lang::new)
            .filter(|lang| {
                let valid = lang.is_valid_target();
                if !valid {
                    warn!("Ignoring stored target language '{}'", lang);
                }
                valid
            })
            .unwrap_or_else(|| Lang::new(DEFAULT_TARGET_LANG))
    }

    pub fn selected_model(&self) -> Option<String> {
        self.read(SELECTED_MODEL_KEY)
    }

    pub fn favorite_model(&self) -> Option<String> {
        self.read(FAVORITE_MODEL_KEY)
    }

    pub fn set_source_language(&self, lang: &Lang) -> Result<()> {
        self.write(INPUT_LANGUAGE_KEY, &lang.as_str())
    }

    pub fn set_target_language(&self, lang: &Lang) -> Result<()> {
        self.write(OUTPUT_LANGUAGE_KEY, &lang.as_str())
    }

    pub fn set_selected_model(&self, model: Option<&str>) -> Result<()> {
        match model {
            Some(model) => self.write(SELECTED_MODEL_KEY, &model),
            None => self.store.remove(SELECTED_MODEL_KEY),
        }
    }

    pub fn set_favorite_model(&self, model: Option<&str>) -> Result<()> {
        match model {
            Some(model) => self.write(FAVORITE_MODEL_KEY, &model),
            None => self.store.remove(FAVORITE_MODEL_KEY),
        }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Failed to read preference '{}', using default: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Corrupt preference '{}' ({}), using default", key, e);
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let encoded = serde_json::to_string(value)
            .map_err(|e| crate::error::Error::PreferenceWrite(e.to_string()))?;
        self.store.set(key, &encoded)
    }
}
