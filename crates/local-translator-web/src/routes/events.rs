//! Server-sent events - pushes coordinator state to the page.

use askama::Template;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use local_translator_core::{DirectoryStatus, ModelEntry, TranslationState};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;
use crate::templates::{ModelPickerTemplate, OutputPanelTemplate, ToastTemplate, View};

/// Everything the model picker renders from.
type PickerFields = (Vec<ModelEntry>, DirectoryStatus, Option<String>, Option<String>);

fn picker_fields(state: &TranslationState) -> PickerFields {
    (
        state.models.clone(),
        state.directory.clone(),
        state.selected_model.clone(),
        state.favorite_model.clone(),
    )
}

fn output_event(state: &TranslationState, max_chars: usize) -> Option<Event> {
    let html = OutputPanelTemplate {
        view: View::new(state, max_chars),
    }
    .render()
    .inspect_err(|e| warn!("Failed to render output panel: {}", e))
    .ok()?;
    Some(Event::default().event("output").data(html))
}

fn models_event(state: &TranslationState, max_chars: usize) -> Option<Event> {
    let html = ModelPickerTemplate {
        view: View::new(state, max_chars),
    }
    .render()
    .inspect_err(|e| warn!("Failed to render model picker: {}", e))
    .ok()?;
    Some(Event::default().event("models").data(html))
}

/// SSE stream of `output` events (output panel HTML, sent on every state
/// change), `models` events (model picker HTML, sent when the listing,
/// directory status, selection or favorite changes) and `toast` events (one
/// per coordinator notification).
///
/// HTMX SSE extension connects to this endpoint and swaps the fragments.
#[allow(tail_expr_drop_order)] // Drop order change in async_stream macro is harmless here
pub async fn events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut states = state.coordinator.subscribe();
    let mut notifications = state.coordinator.subscribe_notifications();
    let max_chars = state.coordinator.max_input_characters();
    let toast_ms = state.toast_ms();

    let stream = async_stream::stream! {
        let snapshot = states.borrow_and_update().clone();
        let mut picker = picker_fields(&snapshot);
        if let Some(event) = models_event(&snapshot, max_chars) {
            yield Ok(event);
        }
        if let Some(event) = output_event(&snapshot, max_chars) {
            yield Ok(event);
        }

        loop {
            let events = tokio::select! {
                changed = states.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = states.borrow_and_update().clone();
                    let fields = picker_fields(&snapshot);
                    let models = if fields == picker {
                        None
                    } else {
                        picker = fields;
                        models_event(&snapshot, max_chars)
                    };
                    [models, output_event(&snapshot, max_chars)]
                }
                received = notifications.recv() => match received {
                    Ok(notification) => {
                        let toast = ToastTemplate::from_notification(&notification, toast_ms)
                            .render()
                            .ok()
                            .map(|html| Event::default().event("toast").data(html));
                        [toast, None]
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!("SSE client missed {} notifications", skipped);
                        [None, None]
                    }
                    Err(RecvError::Closed) => break,
                },
            };

            for event in events.into_iter().flatten() {
                yield Ok(event);
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
