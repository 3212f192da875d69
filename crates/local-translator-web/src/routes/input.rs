//! Input routes - typed text and text file uploads.

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum_extra::extract::Multipart;
use std::sync::Arc;
use tracing::{debug, info};

use super::InputForm;
use crate::helpers::{ResultExt, RouteResult};
use crate::state::AppState;
use crate::templates::{CharCounterTemplate, WorkspaceTemplate};

/// Record the textarea contents - returns the character counter.
///
/// HTMX: fired on `input` with a short client-side delay; the coordinator
/// applies the real auto-translate debounce.
pub async fn set_input(
    State(state): State<Arc<AppState>>,
    Form(form): Form<InputForm>,
) -> CharCounterTemplate {
    state.coordinator.set_input(form.text).await;
    CharCounterTemplate { view: state.view() }
}

/// Empty input and output, dropping any running translation - returns the workspace.
pub async fn clear_input(State(state): State<Arc<AppState>>) -> WorkspaceTemplate {
    state.coordinator.clear().await;
    WorkspaceTemplate { view: state.view() }
}

/// Load a UTF-8 text file into the input - returns the workspace.
pub async fn upload_text(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> RouteResult<WorkspaceTemplate> {
    while let Some(field) = multipart.next_field().await.or_bad_request()? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload.txt").to_string();
        let data = field.bytes().await.or_bad_request()?;
        let text = String::from_utf8(data.to_vec())
            .map_err(|_| (StatusCode::BAD_REQUEST, format!("{filename} is not UTF-8 text")))?;

        info!("Loaded {} ({} bytes) into the input", filename, text.len());
        state.coordinator.set_input(text).await;
        return Ok(WorkspaceTemplate { view: state.view() });
    }

    debug!("Upload request without a file field");
    Err((StatusCode::BAD_REQUEST, "No file uploaded".to_string()))
}
