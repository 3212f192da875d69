mod ollama;
pub mod prompt;
mod traits;

pub use ollama::OllamaClient;
pub use traits::{ModelDirectory, ModelEntry, TranslationRequest, Translator, TranslatorInfo};

use crate::config::AppConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create the Ollama client from configuration
pub fn create_client(config: &AppConfig) -> Result<Arc<OllamaClient>> {
    let client = OllamaClient::new(&config.server, config.generation)?;
    Ok(Arc::new(client))
}
