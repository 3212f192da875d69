use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::language::LanguageSelection;

/// Information about a translator backend
#[derive(Debug, Clone)]
pub struct TranslatorInfo {
    /// Human-readable name
    pub name: &'static str,
}

/// An installed model as offered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Identifier sent back to the server
    pub id: String,
    /// Display label
    pub label: String,
}

impl ModelEntry {
    /// Entry whose label is the identifier itself.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
        }
    }
}

/// One translation call, tagged with the sequence number it was issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub sequence: u64,
    pub text: String,
    pub languages: LanguageSelection,
    pub model: String,
}

/// Trait for translation backends
#[async_trait]
pub trait Translator: Send + Sync {
    /// Get information about this translator
    fn info(&self) -> TranslatorInfo;

    /// Get the translator name (convenience method)
    fn name(&self) -> &'static str {
        self.info().name
    }

    /// Translate the request's text, returning the model output unmodified
    async fn translate(&self, request: &TranslationRequest) -> Result<String>;
}

/// Source of the installed model listing
#[async_trait]
pub trait ModelDirectory: Send + Sync {
    /// List installed models. An empty list is a valid answer.
    async fn list_models(&self) -> Result<Vec<ModelEntry>>;
}
