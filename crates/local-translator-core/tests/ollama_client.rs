//! Integration tests for the Ollama HTTP client
//!
//! Each test starts a throwaway axum server on a random local port that
//! imitates the parts of the Ollama API the client talks to.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use local_translator_core::{
    Error, GenerationOptions, Lang, LanguageSelection, ModelDirectory, OllamaClient,
    ServerConfig, TranslationRequest, Translator,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Seen = Arc<Mutex<Option<Value>>>;

/// Serve `router` on 127.0.0.1 and return the API base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn client(api_base: &str) -> OllamaClient {
    OllamaClient::new(&ServerConfig::new(api_base), GenerationOptions::default()).unwrap()
}

fn request(text: &str, source: &str, target: &str) -> TranslationRequest {
    TranslationRequest {
        sequence: 1,
        text: text.to_string(),
        languages: LanguageSelection::new(Lang::new(source), Lang::new(target)).unwrap(),
        model: "llama3:8b".to_string(),
    }
}

// =============================================================================
// Model listing
// =============================================================================

#[tokio::test]
async fn test_lists_installed_models() {
    let router = Router::new().route(
        "/api/tags",
        get(|| async {
            Json(json!({
                "models": [
                    {"name": "llama3:8b", "size": 4_661_224_676_u64, "details": {"family": "llama"}},
                    {"name": "gemma2:2b", "digest": "abc"}
                ]
            }))
        }),
    );
    let base = serve(router).await;

    let models = client(&base).list_models().await.unwrap();
    let ids: Vec<_> = models.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["llama3:8b", "gemma2:2b"]);
    assert_eq!(models[0].label, "llama3:8b");
}

#[tokio::test]
async fn test_empty_listing() {
    let router = Router::new().route("/api/tags", get(|| async { Json(json!({"models": []})) }));
    let base = serve(router).await;

    assert!(client(&base).list_models().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_server() {
    // Grab a free port, then close it again
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}/api"))
        .list_models()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unreachable(_)), "got {err:?}");
}

#[tokio::test]
async fn test_listing_timeout() {
    let router = Router::new().route(
        "/api/tags",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"models": []}))
        }),
    );
    let base = serve(router).await;

    let mut server = ServerConfig::new(base);
    server.directory_timeout_ms = 100;
    let client = OllamaClient::new(&server, GenerationOptions::default()).unwrap();

    let err = client.list_models().await.unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }), "got {err:?}");
    assert!(err.to_string().contains("may not be running"));
}

// =============================================================================
// Translation
// =============================================================================

async fn record_chat(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    *seen.lock().unwrap() = Some(body);
    Json(json!({
        "model": "llama3:8b",
        "message": {"role": "assistant", "content": "Good morning"},
        "done": true
    }))
}

#[tokio::test]
async fn test_translation_request_shape() {
    let seen = Seen::default();
    let router = Router::new()
        .route("/api/chat", post(record_chat))
        .with_state(seen.clone());
    let base = serve(router).await;

    let translated = client(&base)
        .translate(&request("Bon dia", "ca", "en"))
        .await
        .unwrap();
    assert_eq!(translated, "Good morning");

    let body = seen.lock().unwrap().clone().unwrap();
    assert_eq!(body["model"], "llama3:8b");
    assert_eq!(body["stream"], false);
    assert_eq!(body["options"]["temperature"], 0.1);
    assert_eq!(body["options"]["seed"], 42);
    assert_eq!(body["messages"][0]["role"], "system");

    let prompt = body["messages"][1]["content"].as_str().unwrap();
    assert!(prompt.contains("from Catalan (from Catalonia) into English"));
    assert!(prompt.ends_with("Bon dia"));
}

#[tokio::test]
async fn test_auto_detect_prompt() {
    let seen = Seen::default();
    let router = Router::new()
        .route("/api/chat", post(record_chat))
        .with_state(seen.clone());
    let base = serve(router).await;

    client(&base)
        .translate(&request("Hallo", "auto", "fr"))
        .await
        .unwrap();

    let body = seen.lock().unwrap().clone().unwrap();
    let prompt = body["messages"][1]["content"].as_str().unwrap();
    assert!(prompt.starts_with("Detect the language"));
    assert!(prompt.contains("into French"));
}

#[tokio::test]
async fn test_server_error_carries_message() {
    let router = Router::new().route(
        "/api/chat",
        post(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "model 'llama3:8b' not found, try pulling it first"})),
            )
        }),
    );
    let base = serve(router).await;

    let err = client(&base)
        .translate(&request("Hola", "es", "en"))
        .await
        .unwrap_err();
    match err {
        Error::ServerError { status, message } => {
            assert_eq!(status, 404);
            assert!(message.unwrap().contains("try pulling it first"));
        }
        other => panic!("expected ServerError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_without_json_body() {
    let router = Router::new().route(
        "/api/chat",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "oops") }),
    );
    let base = serve(router).await;

    let err = client(&base)
        .translate(&request("Hola", "es", "en"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ServerError { status: 500, message: None }));
}

#[tokio::test]
async fn test_malformed_response() {
    let router = Router::new().route("/api/chat", post(|| async { "definitely not json" }));
    let base = serve(router).await;

    let err = client(&base)
        .translate(&request("Hola", "es", "en"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn test_translation_timeout() {
    let router = Router::new().route(
        "/api/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "late"
        }),
    );
    let base = serve(router).await;

    let mut server = ServerConfig::new(base);
    server.translation_timeout_ms = 100;
    let client = OllamaClient::new(&server, GenerationOptions::default()).unwrap();

    let err = client
        .translate(&request("Hola", "es", "en"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout { operation: "translation request", .. }));
}
