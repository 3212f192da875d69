//! Model routes - directory refresh, selection and favorites.

use axum::extract::{Form, State};
use std::sync::Arc;

use super::ModelForm;
use crate::helpers::{CoreResultExt, OptionExt, RouteResult};
use crate::state::AppState;
use crate::templates::ModelPickerTemplate;

/// Reload the installed model list - returns the model picker.
///
/// Failures are reported by the coordinator as toasts; the picker shows the
/// directory status either way.
pub async fn refresh_models(State(state): State<Arc<AppState>>) -> ModelPickerTemplate {
    let _ = state.coordinator.refresh_models().await;
    ModelPickerTemplate { view: state.view() }
}

/// Select a listed model - returns the model picker.
pub async fn select_model(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ModelForm>,
) -> RouteResult<ModelPickerTemplate> {
    let model = form.model.or_not_found("No model given")?;
    state.coordinator.select_model(&model).await.or_status()?;
    Ok(ModelPickerTemplate { view: state.view() })
}

/// Toggle the favorite mark on a model (the selected one by default).
pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ModelForm>,
) -> RouteResult<ModelPickerTemplate> {
    let model = form
        .model
        .or_else(|| state.coordinator.snapshot().selected_model)
        .or_not_found("No model selected")?;
    state.coordinator.toggle_favorite(&model).await.or_status()?;
    Ok(ModelPickerTemplate { view: state.view() })
}
