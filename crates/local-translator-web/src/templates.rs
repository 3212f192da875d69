//! Askama templates for HTMX responses.
//!
//! ## HTMX Patterns Used
//!
//! - **SSE Swaps**: The output panel and the toast area listen on
//!   `/api/events`; the server pushes rendered fragments on every change
//!
//! - **Fragment Replacement**: Language, swap and upload requests return the
//!   whole workspace; model requests return the model picker
//!
//! - **Error Swaps**: Validation failures return 422 with a toast fragment,
//!   which `app.js` lets HTMX swap into the toast area
//!
//! ## Template Structure
//!
//! - `base.html` - Common layout with CSS/JS
//! - `index.html` - The translator page
//! - `partials/` - Workspace, language bar, model picker, panels, toast

use askama::Template;
use askama_web::WebTemplate;
use local_translator_core::{
    DirectoryStatus, Notification, TranslationState, source_languages, target_languages,
};

// =============================================================================
// View Model
// =============================================================================

/// A language as offered in a dropdown.
pub struct LanguageChoice {
    pub code: &'static str,
    pub label: String,
    pub selected: bool,
}

/// An installed model as offered in the picker.
pub struct ModelChoice {
    pub id: String,
    pub label: String,
    pub selected: bool,
    pub favorite: bool,
}

/// Everything the templates render, flattened from a coordinator snapshot.
pub struct View {
    pub input: String,
    pub output: String,
    pub error: String,
    pub has_error: bool,
    pub busy: bool,
    pub auto_translate: bool,
    pub can_swap: bool,
    pub sources: Vec<LanguageChoice>,
    pub targets: Vec<LanguageChoice>,
    pub models: Vec<ModelChoice>,
    pub has_models: bool,
    pub selected_is_favorite: bool,
    pub loading_models: bool,
    /// Directory problem shown next to the picker (empty when fine)
    pub directory_message: String,
    pub input_chars: usize,
    pub max_chars: usize,
    pub over_limit: bool,
}

impl View {
    pub fn new(state: &TranslationState, max_chars: usize) -> Self {
        let source = state.languages.source().as_str();
        let target = state.languages.target().as_str();
        let input_chars = state.input_chars();

        let sources = source_languages()
            .into_iter()
            .map(|l| LanguageChoice {
                code: l.code,
                label: format!("{} {}", l.flag, l.name),
                selected: l.code == source,
            })
            .collect();

        let targets = target_languages()
            .into_iter()
            .map(|l| LanguageChoice {
                code: l.code,
                label: format!("{} {}", l.flag, l.name),
                selected: l.code == target,
            })
            .collect();

        let models: Vec<_> = state
            .models
            .iter()
            .map(|m| ModelChoice {
                id: m.id.clone(),
                label: m.label.clone(),
                selected: state.selected_model.as_deref() == Some(m.id.as_str()),
                favorite: state.is_favorite(&m.id),
            })
            .collect();

        let directory_message = match &state.directory {
            DirectoryStatus::Unloaded | DirectoryStatus::Loading | DirectoryStatus::Ready => {
                String::new()
            }
            DirectoryStatus::NoModels => "No models installed".to_string(),
            DirectoryStatus::Failed(reason) => format!("Model list unavailable: {reason}"),
        };

        Self {
            input: state.input.clone(),
            output: state.output.clone(),
            error: state.error.clone().unwrap_or_default(),
            has_error: state.error.is_some(),
            busy: state.busy,
            auto_translate: state.is_auto_translate(),
            can_swap: state.can_swap(),
            sources,
            targets,
            has_models: !models.is_empty(),
            models,
            selected_is_favorite: state
                .selected_model
                .as_deref()
                .is_some_and(|m| state.is_favorite(m)),
            loading_models: state.directory == DirectoryStatus::Loading,
            directory_message,
            input_chars,
            max_chars,
            over_limit: input_chars > max_chars,
        }
    }

    pub fn has_directory_message(&self) -> bool {
        !self.directory_message.is_empty()
    }
}

// =============================================================================
// Full Page Templates
// =============================================================================

/// The translator page.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: View,
    /// Milliseconds before a toast dismisses itself
    pub toast_ms: u64,
}

// =============================================================================
// Fragment Templates (HTMX partial responses)
// =============================================================================

/// Language bar, input panel and output panel.
#[derive(Template, WebTemplate)]
#[template(path = "partials/workspace.html")]
pub struct WorkspaceTemplate {
    pub view: View,
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/model_picker.html")]
pub struct ModelPickerTemplate {
    pub view: View,
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/char_counter.html")]
pub struct CharCounterTemplate {
    pub view: View,
}

/// Contents of the output panel, pushed over SSE.
#[derive(Template, WebTemplate)]
#[template(path = "partials/output_panel.html")]
pub struct OutputPanelTemplate {
    pub view: View,
}

/// A single toast, pushed over SSE or returned with a 422.
#[derive(Template, WebTemplate)]
#[template(path = "partials/toast.html")]
pub struct ToastTemplate {
    pub level: &'static str,
    pub message: String,
    pub toast_ms: u64,
}

impl ToastTemplate {
    pub fn from_notification(notification: &Notification, toast_ms: u64) -> Self {
        Self {
            level: notification.level.as_str(),
            message: notification.message.clone(),
            toast_ms,
        }
    }

    pub fn info(message: impl Into<String>, toast_ms: u64) -> Self {
        Self {
            level: "info",
            message: message.into(),
            toast_ms,
        }
    }

    pub fn error(message: impl Into<String>, toast_ms: u64) -> Self {
        Self {
            level: "error",
            message: message.into(),
            toast_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use local_translator_core::{Lang, LanguageSelection, ModelEntry};

    fn state() -> TranslationState {
        TranslationState {
            input: "Bon dia".to_string(),
            languages: LanguageSelection::new(Lang::new("ca"), Lang::new("en")).unwrap(),
            models: vec![ModelEntry::new("llama3"), ModelEntry::new("gemma2")],
            selected_model: Some("gemma2".to_string()),
            favorite_model: Some("gemma2".to_string()),
            directory: DirectoryStatus::Ready,
            ..Default::default()
        }
    }

    #[test]
    fn test_view_marks_selection() {
        let view = View::new(&state(), 6400);
        assert!(view.sources.iter().any(|l| l.selected && l.code == "ca"));
        assert!(view.targets.iter().any(|l| l.selected && l.code == "en"));
        assert!(view.models[1].selected && view.models[1].favorite);
        assert!(view.selected_is_favorite);
        assert!(view.can_swap);
        assert!(!view.auto_translate);
        assert_eq!(view.input_chars, 7);
        assert!(!view.has_directory_message());
    }

    #[test]
    fn test_view_flags_over_limit() {
        let view = View::new(&state(), 5);
        assert!(view.over_limit);
    }

    #[test]
    fn test_output_is_escaped() {
        let mut state = state();
        state.output = "<script>alert(1)</script>".to_string();
        let html = OutputPanelTemplate {
            view: View::new(&state, 6400),
        }
        .render()
        .unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("alert(1)"));
    }

    #[test]
    fn test_no_models_message() {
        let mut state = state();
        state.models.clear();
        state.selected_model = None;
        state.directory = DirectoryStatus::NoModels;

        let html = ModelPickerTemplate {
            view: View::new(&state, 6400),
        }
        .render()
        .unwrap();
        assert!(html.contains("No models installed"));
    }
}
