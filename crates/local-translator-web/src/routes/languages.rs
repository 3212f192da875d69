//! Language routes - source/target selection and swapping.

use axum::extract::{Form, State};
use local_translator_core::Lang;
use std::sync::Arc;

use super::LanguageForm;
use crate::helpers::{CoreResultExt, RouteResult};
use crate::state::AppState;
use crate::templates::WorkspaceTemplate;

/// Update either or both languages - returns the workspace.
///
/// The displayed translation is cleared; in auto-detect mode the coordinator
/// re-translates once the debounce elapses.
pub async fn set_languages(
    State(state): State<Arc<AppState>>,
    Form(update): Form<LanguageForm>,
) -> RouteResult<WorkspaceTemplate> {
    state
        .coordinator
        .set_languages(update.source.map(Lang::new), update.target.map(Lang::new))
        .await
        .or_status()?;

    Ok(WorkspaceTemplate { view: state.view() })
}

/// Swap source and target - returns the workspace with exchanged texts.
pub async fn swap_languages(State(state): State<Arc<AppState>>) -> RouteResult<WorkspaceTemplate> {
    state.coordinator.swap_languages().await.or_status()?;
    Ok(WorkspaceTemplate { view: state.view() })
}
