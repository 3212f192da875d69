//! Translation request coordinator.
//!
//! Owns the translation lifecycle on behalf of a front-end:
//! - at most one trusted request in flight, identified by a sequence number
//! - results of superseded requests are dropped on arrival ("latest sequence wins")
//! - auto-translate mode (source = auto-detect) submits after a quiet period
//! - language, model and favorite choices are written through to [`Preferences`]
//!
//! Front-ends observe state through [`Coordinator::subscribe`] and transient
//! messages through [`Coordinator::subscribe_notifications`].

mod debounce;
mod selection;
mod state;

pub use debounce::Debouncer;
pub use selection::choose_model;
pub use state::{
    DirectoryStatus, Notification, NotificationLevel, SkipReason, SubmitOutcome,
    TranslationState,
};

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, broadcast, watch};
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, TranslationCache};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::language::{Lang, LanguageSelection};
use crate::preferences::Preferences;
use crate::translator::{ModelDirectory, ModelEntry, TranslationRequest, Translator, create_client};

const NOTIFICATION_CAPACITY: usize = 32;

/// Handle to the coordinator. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct Coordinator {
    shared: Arc<Shared>,
}

struct Shared {
    translator: Arc<dyn Translator>,
    directory: Arc<dyn ModelDirectory>,
    preferences: Preferences,
    cache: Option<TranslationCache>,
    debounce: Duration,
    max_input_characters: usize,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<TranslationState>,
    notify_tx: broadcast::Sender<Notification>,
}

struct Inner {
    state: TranslationState,
    debouncer: Debouncer,
    /// Text, languages and model of the last translation, if it succeeded
    /// and nothing has failed since
    last_success: Option<CacheKey>,
    directory_generation: u64,
}

impl Inner {
    fn current_key(&self) -> Option<CacheKey> {
        let model = self.state.selected_model.as_deref()?;
        Some(CacheKey::new(&self.state.input, &self.state.languages, model))
    }

    /// Make any in-flight request stale and release the busy flag.
    fn supersede(&mut self) {
        if self.state.busy {
            debug!("Superseding in-flight translation #{}", self.state.sequence);
        }
        self.state.sequence += 1;
        self.state.busy = false;
        self.last_success = None;
    }
}

enum Step {
    Dispatch(TranslationRequest),
    Skip(SkipReason),
}

impl Coordinator {
    /// Build a coordinator talking to the configured Ollama server, with
    /// preferences persisted on disk.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let preferences = Preferences::open(&config.preferences)?;
        Self::with_preferences(config, preferences)
    }

    /// Build a coordinator talking to the configured Ollama server.
    pub fn with_preferences(config: &AppConfig, preferences: Preferences) -> Result<Self> {
        let client = create_client(config)?;
        Ok(Self::with_parts(client.clone(), client, preferences, config))
    }

    /// Build a coordinator from explicit backends.
    pub fn with_parts(
        translator: Arc<dyn Translator>,
        directory: Arc<dyn ModelDirectory>,
        preferences: Preferences,
        config: &AppConfig,
    ) -> Self {
        let languages = LanguageSelection::new(
            preferences.source_language(),
            preferences.target_language(),
        )
        .unwrap_or_default();

        let state = TranslationState {
            languages,
            selected_model: preferences.selected_model(),
            favorite_model: preferences.favorite_model(),
            ..Default::default()
        };

        debug!(
            "Restored preferences: {} -> {}, model {:?}, favorite {:?}",
            state.languages.source(),
            state.languages.target(),
            state.selected_model,
            state.favorite_model
        );

        let (state_tx, _) = watch::channel(state.clone());
        let (notify_tx, _) = broadcast::channel(NOTIFICATION_CAPACITY);

        Self {
            shared: Arc::new(Shared {
                translator,
                directory,
                preferences,
                cache: TranslationCache::from_config(&config.cache),
                debounce: config.translation.debounce(),
                max_input_characters: config.translation.max_input_characters,
                inner: Mutex::new(Inner {
                    state,
                    debouncer: Debouncer::new(),
                    last_success: None,
                    directory_generation: 0,
                }),
                state_tx,
                notify_tx,
            }),
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn snapshot(&self) -> TranslationState {
        self.shared.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TranslationState> {
        self.shared.state_tx.subscribe()
    }

    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.shared.notify_tx.subscribe()
    }

    pub fn max_input_characters(&self) -> usize {
        self.shared.max_input_characters
    }

    pub fn translator_name(&self) -> &'static str {
        self.shared.translator.name()
    }

    /// Wait until no trusted request is in flight.
    pub async fn settled(&self) {
        let mut rx = self.subscribe();
        let _ = rx.wait_for(|s| !s.busy).await;
    }

    // =========================================================================
    // Input and submission
    // =========================================================================

    /// Replace the input text. In auto-translate mode this restarts the
    /// debounce timer.
    pub async fn set_input(&self, text: impl Into<String>) {
        let text = text.into();
        let mut inner = self.shared.inner.lock().await;
        if inner.state.input == text {
            return;
        }
        inner.state.input = text;
        if inner.state.languages.is_auto_detect() {
            self.arm_debounce(&mut inner);
        }
        self.publish(&inner);
    }

    /// Submit `text` for translation (translate button, keyboard shortcut).
    pub async fn submit(&self, text: impl Into<String>) -> Result<SubmitOutcome> {
        let text = text.into();
        let request = {
            let mut inner = self.shared.inner.lock().await;
            inner.state.input = text;
            inner.debouncer.cancel();
            match self.begin(&mut inner)? {
                Step::Dispatch(request) => request,
                Step::Skip(reason) => {
                    self.publish(&inner);
                    return Ok(SubmitOutcome::Skipped(reason));
                }
            }
        };
        Ok(self.dispatch(request).await)
    }

    /// Submit the current input.
    pub async fn translate_input(&self) -> Result<SubmitOutcome> {
        let text = self.shared.inner.lock().await.state.input.clone();
        self.submit(text).await
    }

    /// Clear input and output, dropping any in-flight request.
    pub async fn clear(&self) {
        let mut inner = self.shared.inner.lock().await;
        inner.debouncer.cancel();
        inner.supersede();
        inner.state.input.clear();
        inner.state.output.clear();
        inner.state.error = None;
        self.publish(&inner);
    }

    /// Validate the current input and claim a sequence number for it.
    fn begin(&self, inner: &mut Inner) -> Result<Step> {
        let text = &inner.state.input;
        if text.trim().is_empty() {
            return Ok(Step::Skip(SkipReason::BlankInput));
        }

        let length = crate::util::char_count(text);
        let max = self.shared.max_input_characters;
        if length > max {
            let err = Error::InputTooLong { length, max };
            inner.state.error = Some(err.to_string());
            inner.last_success = None;
            self.publish(inner);
            return Err(err);
        }

        let Some(model) = inner.state.selected_model.clone() else {
            return Ok(Step::Skip(SkipReason::NoModel));
        };

        if inner.state.busy {
            return Ok(Step::Skip(SkipReason::InFlight));
        }

        inner.state.sequence += 1;
        inner.state.error = None;
        inner.state.busy = true;
        self.publish(inner);

        Ok(Step::Dispatch(TranslationRequest {
            sequence: inner.state.sequence,
            text: inner.state.input.clone(),
            languages: inner.state.languages.clone(),
            model,
        }))
    }

    /// Answer from cache or spawn the network call. Never awaits the network.
    async fn dispatch(&self, request: TranslationRequest) -> SubmitOutcome {
        let sequence = request.sequence;
        let key = CacheKey::new(&request.text, &request.languages, &request.model);

        if let Some(cache) = &self.shared.cache
            && let Some(cached) = cache.get(&key).await
        {
            debug!("Cache hit for translation #{}", sequence);
            self.complete(request, Ok(cached), false).await;
            return SubmitOutcome::Cached(sequence);
        }

        info!(
            "Translating #{} ({} chars, {} -> {}) with {}",
            sequence,
            crate::util::char_count(&request.text),
            request.languages.source(),
            request.languages.target(),
            request.model
        );

        let this = self.clone();
        tokio::spawn(async move {
            let result = this.shared.translator.translate(&request).await;
            this.complete(request, result, true).await;
        });

        SubmitOutcome::Issued(sequence)
    }

    /// Apply a finished request if it is still the latest one.
    async fn complete(&self, request: TranslationRequest, result: Result<String>, store: bool) {
        let key = CacheKey::new(&request.text, &request.languages, &request.model);

        // A superseded answer is still a valid translation of its own key
        if store
            && let (Ok(text), Some(cache)) = (&result, &self.shared.cache)
        {
            cache.insert(&key, text.clone()).await;
        }

        let mut inner = self.shared.inner.lock().await;

        if inner.state.sequence != request.sequence {
            debug!(
                "Discarding stale translation #{} (current #{})",
                request.sequence, inner.state.sequence
            );
            return;
        }

        inner.state.busy = false;

        match result {
            Ok(text) => {
                inner.state.output = text;
                inner.state.error = None;
                inner.last_success = Some(key);
            }
            Err(e) => {
                warn!("Translation #{} failed: {}", request.sequence, e);
                inner.state.output.clear();
                inner.state.error = Some(e.to_string());
                inner.last_success = None;
                self.notify(Notification::error(e.to_string()));
            }
        }

        // Input changed while the request was running and the timer that
        // would have covered it was skipped
        if inner.state.languages.is_auto_detect()
            && inner.state.input != request.text
            && !inner.debouncer.is_pending()
        {
            self.arm_debounce(&mut inner);
        }

        self.publish(&inner);
    }

    fn arm_debounce(&self, inner: &mut Inner) {
        let weak = Arc::downgrade(&self.shared);
        inner
            .debouncer
            .schedule(self.shared.debounce, move |ticket| async move {
                if let Some(shared) = weak.upgrade() {
                    Self { shared }.fire_debounce(ticket).await;
                }
            });
    }

    async fn fire_debounce(&self, ticket: u64) {
        let request = {
            let mut inner = self.shared.inner.lock().await;
            if !inner.debouncer.claim(ticket) || !inner.state.languages.is_auto_detect() {
                return;
            }
            if inner.last_success.is_some() && inner.current_key() == inner.last_success {
                debug!("Input already translated, not resubmitting");
                return;
            }
            match self.begin(&mut inner) {
                Ok(Step::Dispatch(request)) => request,
                Ok(Step::Skip(reason)) => {
                    debug!("Auto-translate skipped: {:?}", reason);
                    return;
                }
                Err(e) => {
                    // Nobody awaits a timer, so the rejection becomes a notification
                    debug!("Auto-translate rejected: {}", e);
                    self.notify(Notification::error(e.to_string()));
                    return;
                }
            }
        };
        self.dispatch(request).await;
    }

    // =========================================================================
    // Languages
    // =========================================================================

    pub async fn set_source_language(&self, source: Lang) -> Result<()> {
        self.set_languages(Some(source), None).await
    }

    pub async fn set_target_language(&self, target: Lang) -> Result<()> {
        self.set_languages(None, Some(target)).await
    }

    /// Change either or both languages. Clears the displayed translation
    /// immediately; in auto-translate mode the debounce timer restarts.
    pub async fn set_languages(&self, source: Option<Lang>, target: Option<Lang>) -> Result<()> {
        let mut inner = self.shared.inner.lock().await;

        let mut languages = inner.state.languages.clone();
        if let Some(source) = source {
            languages.set_source(source)?;
        }
        if let Some(target) = target {
            languages.set_target(target)?;
        }
        if languages == inner.state.languages {
            return Ok(());
        }

        if languages.source() != inner.state.languages.source() {
            self.persist(self.shared.preferences.set_source_language(languages.source()));
        }
        if languages.target() != inner.state.languages.target() {
            self.persist(self.shared.preferences.set_target_language(languages.target()));
        }

        debug!("Languages now {} -> {}", languages.source(), languages.target());
        inner.state.languages = languages;
        inner.supersede();
        inner.state.output.clear();
        inner.state.error = None;

        if !inner.state.languages.is_auto_detect() {
            inner.debouncer.cancel();
        } else if !inner.state.input.trim().is_empty() {
            self.arm_debounce(&mut inner);
        }

        self.publish(&inner);
        Ok(())
    }

    /// Swap source and target. When a translation is displayed, input and
    /// output trade places as well.
    pub async fn swap_languages(&self) -> Result<()> {
        let mut inner = self.shared.inner.lock().await;
        inner.state.languages.swap()?;

        self.persist(self.shared.preferences.set_source_language(inner.state.languages.source()));
        self.persist(self.shared.preferences.set_target_language(inner.state.languages.target()));

        inner.debouncer.cancel();
        inner.supersede();
        inner.state.error = None;
        if !inner.state.output.is_empty() {
            let state = &mut inner.state;
            std::mem::swap(&mut state.input, &mut state.output);
        }

        self.publish(&inner);
        Ok(())
    }

    // =========================================================================
    // Models
    // =========================================================================

    /// Fetch the model listing and re-apply the selection rules.
    pub async fn refresh_models(&self) -> Result<Vec<ModelEntry>> {
        let generation = {
            let mut inner = self.shared.inner.lock().await;
            inner.directory_generation += 1;
            inner.state.directory = DirectoryStatus::Loading;
            self.publish(&inner);
            inner.directory_generation
        };

        let result = self.shared.directory.list_models().await;

        let mut inner = self.shared.inner.lock().await;
        if inner.directory_generation != generation {
            debug!("Discarding stale model listing");
            return result;
        }

        match result {
            Ok(models) => {
                let choice = choose_model(
                    inner.state.selected_model.as_deref(),
                    inner.state.favorite_model.as_deref(),
                    &models,
                );

                if choice != inner.state.selected_model {
                    self.persist(self.shared.preferences.set_selected_model(choice.as_deref()));
                    inner.supersede();
                }

                if models.is_empty() {
                    info!("Server has no models installed");
                    inner.state.directory = DirectoryStatus::NoModels;
                    self.notify(Notification::info(
                        "No models installed. Pull one with `ollama pull <model>`.",
                    ));
                } else {
                    info!("Found {} models, using {:?}", models.len(), choice);
                    inner.state.directory = DirectoryStatus::Ready;
                }

                inner.state.selected_model = choice;
                inner.state.models.clone_from(&models);
                self.publish(&inner);
                Ok(models)
            }
            Err(e) => {
                warn!("Failed to list models: {}", e);
                inner.state.directory = DirectoryStatus::Failed(e.to_string());
                self.notify(Notification::error(e.to_string()));
                self.publish(&inner);
                Err(e)
            }
        }
    }

    /// Select a model from the current listing. Any in-flight request is
    /// superseded; the displayed translation stays.
    pub async fn select_model(&self, model: &str) -> Result<()> {
        let mut inner = self.shared.inner.lock().await;
        if !inner.state.models.iter().any(|m| m.id == model) {
            return Err(Error::UnknownModel(model.to_string()));
        }
        if inner.state.selected_model.as_deref() == Some(model) {
            return Ok(());
        }

        self.persist(self.shared.preferences.set_selected_model(Some(model)));
        inner.state.selected_model = Some(model.to_string());
        inner.supersede();
        debug!("Selected model {}", model);
        self.publish(&inner);
        Ok(())
    }

    /// Set or clear the favorite model. A new favorite must be listed.
    pub async fn set_favorite_model(&self, model: Option<&str>) -> Result<()> {
        let mut inner = self.shared.inner.lock().await;
        if let Some(model) = model
            && !inner.state.models.iter().any(|m| m.id == model)
        {
            return Err(Error::UnknownModel(model.to_string()));
        }

        self.persist(self.shared.preferences.set_favorite_model(model));
        inner.state.favorite_model = model.map(str::to_string);
        self.publish(&inner);
        Ok(())
    }

    /// Make `model` the favorite, or clear the favorite if it already is.
    pub async fn toggle_favorite(&self, model: &str) -> Result<()> {
        let is_favorite = self.shared.inner.lock().await.state.is_favorite(model);
        if is_favorite {
            self.set_favorite_model(None).await
        } else {
            self.set_favorite_model(Some(model)).await
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn publish(&self, inner: &Inner) {
        self.shared.state_tx.send_replace(inner.state.clone());
    }

    fn notify(&self, notification: Notification) {
        // No receivers is fine: nobody is displaying toasts
        let _ = self.shared.notify_tx.send(notification);
    }

    fn persist(&self, result: Result<()>) {
        if let Err(e) = result {
            warn!("Failed to save preference: {}", e);
            self.notify(Notification::error(e.to_string()));
        }
    }
}
