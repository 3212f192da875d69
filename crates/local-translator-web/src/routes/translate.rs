//! Translation route - explicit submission (button or Ctrl+Enter).

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use local_translator_core::{SkipReason, SubmitOutcome};
use std::sync::Arc;
use tracing::debug;

use super::InputForm;
use crate::helpers::status_for;
use crate::state::AppState;
use crate::templates::ToastTemplate;

/// Submit the posted text.
///
/// Returns 204 when a translation was issued or answered from cache (the
/// output panel follows over SSE), a toast when nothing was sent, and 422
/// with an error toast when the input is rejected.
pub async fn translate(
    State(state): State<Arc<AppState>>,
    Form(form): Form<InputForm>,
) -> Response {
    let toast_ms = state.toast_ms();

    match state.coordinator.submit(form.text).await {
        Ok(
            SubmitOutcome::Issued(_)
            | SubmitOutcome::Cached(_)
            | SubmitOutcome::Skipped(SkipReason::BlankInput),
        ) => {
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(SubmitOutcome::Skipped(SkipReason::NoModel)) => {
            ToastTemplate::info("Select a model first", toast_ms).into_response()
        }
        Ok(SubmitOutcome::Skipped(SkipReason::InFlight)) => {
            ToastTemplate::info("A translation is already running", toast_ms).into_response()
        }
        Err(e) => {
            debug!("Rejected submission: {}", e);
            (status_for(&e), ToastTemplate::error(e.to_string(), toast_ms)).into_response()
        }
    }
}
