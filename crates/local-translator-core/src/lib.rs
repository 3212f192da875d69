//! Local Translator Core Library
//!
//! This library provides the core functionality for translating text with a
//! locally running Ollama server:
//! - Model listing and translation requests against the Ollama HTTP API
//! - A request coordinator (debounced auto-translate, stale result suppression)
//! - Persisted user preferences (languages, selected and favorite model)
//! - An in-memory translation cache

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod language;
pub mod preferences;
pub mod translator;
pub mod util;

pub use cache::{CacheKey, TranslationCache};
pub use config::{AppConfig, GenerationOptions, MAX_INPUT_CHARACTERS, ServerConfig};
pub use coordinator::{
    Coordinator, DirectoryStatus, Notification, NotificationLevel, SkipReason, SubmitOutcome,
    TranslationState,
};
pub use error::{Error, ErrorKind, Result};
pub use language::{
    AUTO_DETECT, DEFAULT_SOURCE_LANG, DEFAULT_TARGET_LANG, Lang, LanguageOption,
    LanguageSelection, flag_for_lang, source_languages, target_languages,
};
pub use preferences::{DiskStore, MemoryStore, PreferenceStore, Preferences};
pub use translator::{
    ModelDirectory, ModelEntry, OllamaClient, TranslationRequest, Translator, create_client,
};
pub use util::clear_preferences;
