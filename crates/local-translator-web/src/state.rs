use anyhow::{Context, Result};
use local_translator_core::{AppConfig, Coordinator, Preferences};

use crate::templates::View;

/// Global application state
///
/// The web front-end is single-user: one coordinator backs every request and
/// every open tab observes the same translation state.
pub struct AppState {
    pub coordinator: Coordinator,
    /// Effective configuration (file, environment and command-line overrides)
    pub config: AppConfig,
}

impl AppState {
    /// Create the state, opening the preference store unless `persist` is off.
    pub fn new(config: AppConfig, persist: bool) -> Result<Self> {
        let coordinator = if persist {
            Coordinator::new(&config).context("Failed to open preference store")?
        } else {
            Coordinator::with_preferences(&config, Preferences::in_memory())
                .context("Failed to create Ollama client")?
        };

        Ok(Self::with_coordinator(coordinator, config))
    }

    pub const fn with_coordinator(coordinator: Coordinator, config: AppConfig) -> Self {
        Self {
            coordinator,
            config,
        }
    }

    /// Render-ready view of the current coordinator state.
    pub fn view(&self) -> View {
        View::new(
            &self.coordinator.snapshot(),
            self.coordinator.max_input_characters(),
        )
    }

    pub const fn toast_ms(&self) -> u64 {
        self.config.ui.toast_ms
    }
}
