//! HTTP route handlers for the translator web application.
//!
//! All routes return HTML fragments for HTMX consumption, except the SSE
//! stream. HTML routes use Askama templates from the `templates` module.

mod events;
mod input;
mod languages;
mod models;
mod pages;
mod translate;

pub use events::events;
pub use input::{clear_input, set_input, upload_text};
pub use languages::{set_languages, swap_languages};
pub use models::{refresh_models, select_model, toggle_favorite};
pub use pages::index;
pub use translate::translate;

use axum::Router;
use axum::routing::{get, post};
use serde::Deserialize as SerdeDeserialize;
use std::sync::Arc;

use crate::state::AppState;

/// Input text as posted by the textarea.
#[derive(SerdeDeserialize, Default)]
pub struct InputForm {
    #[serde(default)]
    pub text: String,
}

/// Language bar selections. Missing fields are left unchanged.
#[derive(SerdeDeserialize, Default)]
pub struct LanguageForm {
    pub source: Option<String>,
    pub target: Option<String>,
}

/// Model picker selection.
#[derive(SerdeDeserialize, Default)]
pub struct ModelForm {
    pub model: Option<String>,
}

/// Pages and API routes, without static files or middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Pages
        .route("/", get(index))
        // API endpoints - HTML fragments (HTMX)
        .route("/api/input", post(set_input))
        .route("/api/translate", post(translate))
        .route("/api/clear", post(clear_input))
        .route("/api/languages", post(set_languages))
        .route("/api/swap", post(swap_languages))
        .route("/api/models/refresh", post(refresh_models))
        .route("/api/model", post(select_model))
        .route("/api/favorite", post(toggle_favorite))
        .route("/api/upload", post(upload_text))
        // Server-sent events
        .route("/api/events", get(events))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use local_translator_core::{
        AppConfig, Coordinator, ModelDirectory, ModelEntry, Preferences, Result,
        TranslationRequest, Translator, translator::TranslatorInfo,
    };
    use futures::StreamExt;
    use std::time::Duration;
    use tower::ServiceExt;

    struct Echo;

    #[async_trait]
    impl Translator for Echo {
        fn info(&self) -> TranslatorInfo {
            TranslatorInfo {
                name: "echo",
            }
        }

        async fn translate(&self, request: &TranslationRequest) -> Result<String> {
            Ok(request.text.to_uppercase())
        }
    }

    #[async_trait]
    impl ModelDirectory for Echo {
        async fn list_models(&self) -> Result<Vec<ModelEntry>> {
            Ok(vec![ModelEntry::new("llama3"), ModelEntry::new("gemma2")])
        }
    }

    /// App whose model listing has not been fetched yet.
    fn unloaded_app() -> (Router, Arc<AppState>) {
        let echo = Arc::new(Echo);
        let config = AppConfig::default();
        let coordinator =
            Coordinator::with_parts(echo.clone(), echo, Preferences::in_memory(), &config);
        let state = Arc::new(AppState::with_coordinator(coordinator, config));
        (router(Arc::clone(&state)), state)
    }

    async fn app() -> (Router, Arc<AppState>) {
        let (app, state) = unloaded_app();
        state.coordinator.refresh_models().await.unwrap();
        (app, state)
    }

    fn form(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_index_renders() {
        let (app, _) = app().await;
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("id=\"workspace\""));
        assert!(html.contains("llama3"));
        assert!(html.contains("sse-connect=\"/api/events\""));
    }

    #[tokio::test]
    async fn test_translate_submits() {
        let (app, state) = app().await;
        let response = app.oneshot(form("/api/translate", "text=hola")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        state.coordinator.settled().await;
        assert_eq!(state.coordinator.snapshot().output, "HOLA");
    }

    #[tokio::test]
    async fn test_overlong_input_is_unprocessable() {
        let (app, state) = app().await;
        let body = format!("text={}", "a".repeat(6401));
        let response = app.oneshot(form("/api/translate", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let html = body_text(response).await;
        assert!(html.contains("toast-error"));
        assert!(html.contains("6400"));
        assert!(!state.coordinator.snapshot().busy);
    }

    #[tokio::test]
    async fn test_input_updates_counter() {
        let (app, _) = app().await;
        let response = app.oneshot(form("/api/input", "text=caf%C3%A9")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("4 / 6400"));
    }

    #[tokio::test]
    async fn test_swap_rejected_in_auto_mode() {
        let (app, _) = app().await;
        let response = app
            .oneshot(Request::post("/api/swap").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_language_change() {
        let (app, state) = app().await;
        let response = app
            .oneshot(form("/api/languages", "source=fr&target=de"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let languages = state.coordinator.snapshot().languages;
        assert_eq!(languages.source().as_str(), "fr");
        assert_eq!(languages.target().as_str(), "de");
    }

    #[tokio::test]
    async fn test_auto_detect_target_rejected() {
        let (app, _) = app().await;
        let response = app.oneshot(form("/api/languages", "target=auto")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_model_selection_and_favorite() {
        let (app, state) = app().await;
        let response = app
            .clone()
            .oneshot(form("/api/model", "model=gemma2"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            state.coordinator.snapshot().selected_model.as_deref(),
            Some("gemma2")
        );

        let response = app.oneshot(form("/api/favorite", "model=gemma2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.coordinator.snapshot().is_favorite("gemma2"));
    }

    #[tokio::test]
    async fn test_unknown_model_rejected() {
        let (app, _) = app().await;
        let response = app.oneshot(form("/api/model", "model=gpt-4")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_clear_empties_workspace() {
        let (app, state) = app().await;
        let response = app
            .clone()
            .oneshot(form("/api/translate", "text=hola"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        state.coordinator.settled().await;

        let response = app
            .oneshot(Request::post("/api/clear").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("id=\"workspace\""));

        let snapshot = state.coordinator.snapshot();
        assert!(snapshot.input.is_empty());
        assert!(snapshot.output.is_empty());
    }

    #[tokio::test]
    async fn test_events_push_model_picker_after_listing() {
        let (app, state) = unloaded_app();
        let response = app
            .oneshot(Request::get("/api/events").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let mut frames = response.into_body().into_data_stream();

        let first = frames.next().await.unwrap().unwrap();
        let first = String::from_utf8(first.to_vec()).unwrap();
        assert!(first.contains("event: models"));
        assert!(!first.contains("llama3"));

        state.coordinator.refresh_models().await.unwrap();

        let pushed = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(frame) = frames.next().await {
                let text = String::from_utf8(frame.unwrap().to_vec()).unwrap();
                if text.contains("event: models") && text.contains("llama3") {
                    return true;
                }
            }
            false
        })
        .await
        .unwrap();
        assert!(pushed);
    }

    #[tokio::test]
    async fn test_upload_loads_text() {
        let (app, state) = app().await;
        let body = "--XBOUNDARY\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"note.txt\"\r\n\
            Content-Type: text/plain\r\n\r\n\
            Bon dia\r\n\
            --XBOUNDARY--\r\n";
        let request = Request::post("/api/upload")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.coordinator.snapshot().input, "Bon dia");
    }
}
