use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::prompt::{SYSTEM_PROMPT, user_prompt};
use super::traits::{ModelDirectory, ModelEntry, TranslationRequest, Translator, TranslatorInfo};
use crate::config::{GenerationOptions, ServerConfig};
use crate::error::{Error, Result};

/// Client for a local Ollama server.
///
/// Serves both the model listing (`GET /tags`) and translations (`POST /chat`).
/// Each call carries its own timeout; nothing is retried.
pub struct OllamaClient {
    client: Client,
    /// Base URL for the API (e.g., "http://localhost:11434/api")
    pub api_base: String,
    directory_timeout: Duration,
    translation_timeout: Duration,
    options: GenerationOptions,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message; 2],
    stream: bool,
    options: GenerationOptions,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

/// Only `name` is used; `model`, `size`, `digest`, `details` etc. are ignored.
#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

const LIST_OPERATION: &str = "fetching the model list";
const CHAT_OPERATION: &str = "translation request";

impl OllamaClient {
    pub fn new(server: &ServerConfig, options: GenerationOptions) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            api_base: server.api_base.trim_end_matches('/').to_string(),
            directory_timeout: server.directory_timeout(),
            translation_timeout: server.translation_timeout(),
            options,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.api_base)
    }

    fn chat_body<'a>(&self, request: &'a TranslationRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &request.model,
            messages: [
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user",
                    content: user_prompt(
                        &request.text,
                        request.languages.source(),
                        request.languages.target(),
                    ),
                },
            ],
            stream: false,
            options: self.options,
        }
    }
}

#[async_trait]
impl ModelDirectory for OllamaClient {
    async fn list_models(&self) -> Result<Vec<ModelEntry>> {
        let url = self.url("tags");
        debug!("Fetching model list from {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.directory_timeout)
            .send()
            .await
            .map_err(|e| transport_error(&e, LIST_OPERATION, self.directory_timeout))?;

        if !response.status().is_success() {
            return Err(server_error(response).await);
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| transport_error(&e, LIST_OPERATION, self.directory_timeout))?;

        debug!("Server lists {} models", tags.models.len());
        Ok(tags.models.into_iter().map(|m| ModelEntry::new(m.name)).collect())
    }
}

#[async_trait]
impl Translator for OllamaClient {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo {
            name: "Ollama",
        }
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        let url = self.url("chat");
        let body = self.chat_body(request);

        debug!(
            "Translation #{} ({} -> {}) with {} to {}",
            request.sequence,
            request.languages.source(),
            request.languages.target(),
            request.model,
            url
        );

        let response = self
            .client
            .post(&url)
            .timeout(self.translation_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e, CHAT_OPERATION, self.translation_timeout))?;

        if !response.status().is_success() {
            return Err(server_error(response).await);
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| transport_error(&e, CHAT_OPERATION, self.translation_timeout))?;

        Ok(chat.message.content)
    }
}

/// Classify a reqwest failure.
fn transport_error(e: &reqwest::Error, operation: &'static str, timeout: Duration) -> Error {
    if e.is_timeout() {
        warn!("{} timed out after {:?}", operation, timeout);
        Error::Timeout { operation, timeout }
    } else if e.is_decode() {
        warn!("Failed to decode response for {}: {}", operation, e);
        Error::InvalidResponse(e.to_string())
    } else {
        warn!("{} failed: {}", operation, e);
        Error::Unreachable(e.to_string())
    }
}

/// Build a `ServerError`, surfacing the server's `error` field when present.
async fn server_error(response: Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .map(|b| b.error);

    warn!("Server error {}: {}", status, body);
    Error::ServerError { status, message }
}
