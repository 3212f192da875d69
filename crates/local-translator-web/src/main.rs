//! Local Translator Web - Web front-end for translating text with Ollama.

mod helpers;
mod routes;
mod state;
mod templates;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, header};
use clap::Parser;
use local_translator_core::AppConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir,
    set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use state::AppState;

/// Uploaded text files are read whole into the input
const UPLOAD_LIMIT_BYTES: usize = 2 * 1024 * 1024;

/// Resolve the static files directory.
///
/// Priority:
/// 1. Explicit path if provided
/// 2. ./static if it exists
/// 3. Crate's built-in static directory
fn resolve_static_dir(explicit_path: Option<&str>) -> PathBuf {
    if let Some(path) = explicit_path {
        return PathBuf::from(path);
    }

    let local_static = PathBuf::from("static");
    if local_static.is_dir() {
        return local_static;
    }

    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}

#[derive(Parser, Debug)]
#[command(name = "local-translator-web")]
#[command(author, version, about = "Local Translator Web Server", long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Ollama API base URL (overrides the config file)
    #[arg(long, env = "OLLAMA_API_BASE")]
    api_base: Option<String>,

    /// Config file (defaults to ~/.config/local-translator/config.toml and ./config.toml)
    #[arg(short, long, env = "LOCAL_TRANSLATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Disable the translation cache
    #[arg(long)]
    no_cache: bool,

    /// Keep preferences in memory only
    #[arg(long)]
    no_persist: bool,

    /// Forget stored preferences on startup
    #[arg(long)]
    reset_preferences: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Static files directory (defaults to ./static or crate's static dir)
    #[arg(long, env = "STATIC_DIR")]
    static_dir: Option<String>,
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            anyhow::ensure!(path.exists(), "Config file {} not found", path.display());
            AppConfig::load_layered(std::slice::from_ref(path))
                .with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => AppConfig::load(),
    };

    if let Some(api_base) = &args.api_base {
        config.server.api_base.clone_from(api_base);
    }
    if args.no_cache {
        config.cache.enabled = false;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_level},sled=warn")));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let config = load_config(&args)?;

    if args.reset_preferences {
        match local_translator_core::clear_preferences(config.preferences.path.clone()) {
            Ok(count) => info!("Cleared {} stored preferences", count),
            Err(e) => warn!("Failed to clear preferences: {}", e),
        }
    }

    info!("Using Ollama at {}", config.server.api_base);

    // Opens the preference store - fails fast if another instance holds it
    let state = Arc::new(
        AppState::new(config, !args.no_persist)
            .context("Failed to initialize application state")?,
    );
    info!("Translating with {}", state.coordinator.translator_name());

    // Initial model listing; failures surface as toasts and in the picker
    let coordinator = state.coordinator.clone();
    tokio::spawn(async move {
        let _ = coordinator.refresh_models().await;
    });

    let app = routes::router(state)
        // Static files with Cache-Control: no-cache (cache but always revalidate via ETag)
        .nest_service(
            "/static",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-cache"),
                ))
                .service(ServeDir::new(resolve_static_dir(args.static_dir.as_deref()))),
        )
        // Middleware
        // Cache-Control for HTML fragments - prevents bfcache issues with HTMX
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, max-age=0"),
        ))
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
