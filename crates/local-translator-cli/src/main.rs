//! Local Translator CLI - Translate text from the command line with Ollama.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use local_translator_core::{
    AppConfig, Coordinator, Lang, Preferences, SkipReason, SubmitOutcome, TranslationState,
};
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "local-translate")]
#[command(author, version, about = "Translate text with a local Ollama server", long_about = None)]
struct Args {
    /// Text to translate (read from --file or stdin when omitted)
    text: Option<String>,

    /// Read the text from a UTF-8 file
    #[arg(short, long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Source language code ("auto" to detect)
    #[arg(short = 's', long)]
    source: Option<String>,

    /// Target language code
    #[arg(short = 't', long)]
    target: Option<String>,

    /// Model to use (must be installed)
    #[arg(short, long)]
    model: Option<String>,

    /// Mark a model as favorite
    #[arg(long)]
    favorite: Option<String>,

    /// List installed models and exit
    #[arg(long)]
    list_models: bool,

    /// Ollama API base URL (overrides the config file)
    #[arg(long, env = "OLLAMA_API_BASE")]
    api_base: Option<String>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable the translation cache
    #[arg(long)]
    no_cache: bool,

    /// Do not read or write stored preferences
    #[arg(long)]
    no_persist: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
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

fn read_input(args: &Args) -> Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }

    if let Some(path) = &args.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        anyhow::bail!("No text given; pass it as an argument, with --file, or on stdin");
    }
    let mut text = String::new();
    stdin
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;
    Ok(text)
}

#[allow(clippy::print_stdout)] // CLI output is intentional
fn print_models(state: &TranslationState) {
    if state.models.is_empty() {
        println!("No models installed. Pull one with `ollama pull <model>`.");
        return;
    }

    for model in &state.models {
        let selected = if state.selected_model.as_deref() == Some(model.id.as_str()) {
            "*"
        } else {
            " "
        };
        let favorite = if state.is_favorite(&model.id) { " ★" } else { "" };
        println!("{selected} {}{favorite}", model.label);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;

    let coordinator = if args.no_persist {
        Coordinator::with_preferences(&config, Preferences::in_memory())
    } else {
        Coordinator::new(&config)
    }
    .context("Failed to initialize translator")?;

    let models = coordinator
        .refresh_models()
        .await
        .context("Failed to list models")?;
    info!("Server has {} models installed", models.len());

    if let Some(favorite) = &args.favorite {
        coordinator
            .set_favorite_model(Some(favorite))
            .await
            .context("Failed to set favorite")?;
    }

    if let Some(model) = &args.model {
        coordinator
            .select_model(model)
            .await
            .context("Failed to select model")?;
    }

    if args.list_models {
        print_models(&coordinator.snapshot());
        return Ok(());
    }

    if args.source.is_some() || args.target.is_some() {
        coordinator
            .set_languages(
                args.source.as_deref().map(Lang::from),
                args.target.as_deref().map(Lang::from),
            )
            .await
            .context("Invalid language")?;
    }

    let text = read_input(&args)?;

    let outcome = coordinator.submit(text).await?;
    match outcome {
        SubmitOutcome::Skipped(SkipReason::BlankInput) => anyhow::bail!("Nothing to translate"),
        SubmitOutcome::Skipped(SkipReason::NoModel) => {
            anyhow::bail!("No models installed. Pull one with `ollama pull <model>`.")
        }
        SubmitOutcome::Skipped(SkipReason::InFlight) => {
            anyhow::bail!("A translation is already running")
        }
        SubmitOutcome::Issued(_) | SubmitOutcome::Cached(_) => {}
    }

    let state = coordinator.snapshot();
    let spinner = ProgressBar::new_spinner();
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap(),
    );
    spinner.set_message(format!(
        "Translating {} -> {} with {}",
        state.languages.source().display_name(),
        state.languages.target().display_name(),
        state.selected_model.as_deref().unwrap_or_default()
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    coordinator.settled().await;
    spinner.finish_and_clear();

    let state = coordinator.snapshot();
    if let Some(error) = state.error {
        anyhow::bail!(error);
    }

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        println!("{}", state.output);
    }

    Ok(())
}
