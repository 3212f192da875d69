use serde::Serialize;
use uuid::Uuid;

use crate::language::LanguageSelection;
use crate::translator::ModelEntry;

/// Outcome of the last model directory fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum DirectoryStatus {
    /// Not fetched yet
    #[default]
    Unloaded,
    Loading,
    Ready,
    /// The server answered with an empty listing
    NoModels,
    Failed(String),
}

/// Snapshot of everything a front-end renders.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TranslationState {
    pub input: String,
    pub output: String,
    /// Error of the latest trusted request, if it failed
    pub error: Option<String>,
    /// A trusted request is in flight
    pub busy: bool,
    /// Latest issued sequence number
    pub sequence: u64,
    pub languages: LanguageSelection,
    pub models: Vec<ModelEntry>,
    pub selected_model: Option<String>,
    pub favorite_model: Option<String>,
    pub directory: DirectoryStatus,
}

impl TranslationState {
    /// Auto-translate mode: the source language is auto-detect.
    pub fn is_auto_translate(&self) -> bool {
        self.languages.is_auto_detect()
    }

    pub fn can_swap(&self) -> bool {
        !self.languages.is_auto_detect()
    }

    pub fn input_chars(&self) -> usize {
        crate::util::char_count(&self.input)
    }

    pub fn is_favorite(&self, model: &str) -> bool {
        self.favorite_model.as_deref() == Some(model)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Error,
}

impl NotificationLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

/// Transient message for the user (rendered as a toast by the web front-end).
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }
}

/// Why a submit did not reach the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    BlankInput,
    NoModel,
    InFlight,
}

/// What `submit` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A network call was issued under this sequence number
    Issued(u64),
    /// Answered from the translation cache under this sequence number
    Cached(u64),
    Skipped(SkipReason),
}

impl SubmitOutcome {
    pub const fn sequence(self) -> Option<u64> {
        match self {
            Self::Issued(seq) | Self::Cached(seq) => Some(seq),
            Self::Skipped(_) => None,
        }
    }
}
