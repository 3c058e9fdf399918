//! Translation session: one request/response cycle at a time.
//!
//! ```text
//! Idle -> Requesting -> Succeeded -> Idle
//!                    \-> Failed    -> Idle
//! ```
//!
//! The session owns the form (source text, language selections, the result
//! on display) and feeds successful translations into the history. Empty
//! input never leaves `Idle`, and a second translate action while a request
//! is outstanding is ignored, whether it comes from the user or from a
//! history replay.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::api::{DetectedLanguage, TranslateOutcome, TranslateRequest, Translation, TranslationBackend};
use crate::config::SessionConfig;
use crate::display::DisplayAdapter;
use crate::error::{Result, LingoError};
use crate::history::{HistoryEntry, HistoryStore};
use crate::language::{LanguageCatalog, AUTO_DETECT};
use crate::latch::SingleFlight;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Requesting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    pub translated_text: String,
    pub detected_source_language: Option<String>,
    pub resolved_target_language: Option<String>,
    pub model_name: Option<String>,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    EmptyInput,
    InFlight,
}

/// How a translate action ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// No request was issued and the state did not change
    Ignored(IgnoreReason),
    /// The cycle ran; `success` tells which way it went
    Finished(SessionResult),
    /// The response arrived after a swap or a cleared input and was dropped
    Discarded,
}

/// What the user has typed and selected, plus the result on display
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormState {
    pub source_text: String,
    /// Language code, or empty / "auto" for detection
    pub source_language: String,
    /// Language code, or empty to let the backend choose
    pub target_language: String,
    /// Last successful translation, until swapped, cleared or a cycle fails
    pub result: Option<SessionResult>,
    pub source_label: String,
}

pub struct TranslationSession {
    backend: Arc<dyn TranslationBackend>,
    history: Arc<Mutex<HistoryStore>>,
    display: Arc<dyn DisplayAdapter>,
    state: Mutex<SessionState>,
    form: Mutex<FormState>,
    flight: SingleFlight,
    sequence: AtomicU64,
    discard_stale: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TranslationSession {
    pub fn new(
        backend: Arc<dyn TranslationBackend>,
        history: Arc<Mutex<HistoryStore>>,
        display: Arc<dyn DisplayAdapter>,
        config: &SessionConfig,
    ) -> Self {
        let form = FormState {
            source_language: config.default_source.clone(),
            target_language: config.default_target.clone(),
            source_label: LanguageCatalog::name_of(source_or_auto(&config.default_source)),
            ..FormState::default()
        };

        Self {
            backend,
            history,
            display,
            state: Mutex::new(SessionState::Idle),
            form: Mutex::new(form),
            flight: SingleFlight::new(),
            sequence: AtomicU64::new(0),
            discard_stale: config.discard_stale_responses,
        }
    }

    pub fn state(&self) -> SessionState {
        *lock(&self.state)
    }

    pub fn is_busy(&self) -> bool {
        self.flight.is_busy()
    }

    pub fn form(&self) -> FormState {
        lock(&self.form).clone()
    }

    pub fn set_source_text(&self, text: impl Into<String>) {
        lock(&self.form).source_text = text.into();
    }

    pub fn set_source_language(&self, code: impl Into<String>) {
        let mut form = lock(&self.form);
        form.source_language = code.into();
        form.source_label = LanguageCatalog::name_of(source_or_auto(&form.source_language));
    }

    pub fn set_target_language(&self, code: impl Into<String>) {
        lock(&self.form).target_language = code.into();
    }

    /// Request for the current form, or `None` when the text is blank
    pub fn build_request(&self) -> Option<TranslateRequest> {
        let form = lock(&self.form);
        let text = form.source_text.trim();
        if text.is_empty() {
            return None;
        }

        let auto_detect = LanguageCatalog::is_auto(&form.source_language);
        let target = form.target_language.trim();

        Some(TranslateRequest {
            text: text.to_string(),
            source_lang: (!auto_detect).then(|| form.source_language.trim().to_string()),
            target_lang: (!LanguageCatalog::is_auto(target)).then(|| target.to_string()),
            auto_detect,
        })
    }

    /// Run one translate cycle for the current form
    pub async fn translate(&self) -> Completion {
        let Some(request) = self.build_request() else {
            debug!("Ignoring translate action on empty input");
            return Completion::Ignored(IgnoreReason::EmptyInput);
        };

        let Some(_flight) = self.flight.try_acquire() else {
            debug!("Translate request already in flight, ignoring");
            return Completion::Ignored(IgnoreReason::InFlight);
        };

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.transition(SessionState::Requesting);
        info!(
            "Translating {} chars ({} -> {}), request #{}",
            request.text.chars().count(),
            request.source_lang.as_deref().unwrap_or(AUTO_DETECT),
            request.target_lang.as_deref().unwrap_or(AUTO_DETECT),
            sequence
        );

        let outcome = self.backend.translate(&request).await;

        if self.discard_stale && self.sequence.load(Ordering::SeqCst) != sequence {
            info!("Discarding response to superseded request #{}", sequence);
            self.transition(SessionState::Idle);
            return Completion::Discarded;
        }

        let result = match outcome {
            Ok(TranslateOutcome::Success(translation)) => self.apply_success(&request, translation),
            Ok(TranslateOutcome::Failure { message }) => {
                warn!("Backend rejected translation: {}", message);
                self.apply_failure(message)
            }
            Err(e) => {
                warn!("Translate request failed: {}", e);
                self.apply_failure(e.user_message())
            }
        };

        self.transition(SessionState::Idle);
        Completion::Finished(result)
    }

    /// Load a history entry into the form and translate it again
    pub async fn replay(&self, id: u64) -> Result<Completion> {
        if self.flight.is_busy() {
            return Ok(Completion::Ignored(IgnoreReason::InFlight));
        }

        let entry = lock(&self.history)
            .get(id)
            .cloned()
            .ok_or(LingoError::EntryNotFound(id))?;

        info!("Replaying history entry {}", id);
        {
            let mut form = lock(&self.form);
            form.source_label = LanguageCatalog::name_of(source_or_auto(&entry.source_language));
            form.source_text = entry.source_text;
            form.source_language = entry.source_language;
            form.target_language = entry.target_language;
            form.result = None;
        }
        self.display.clear_result();

        Ok(self.translate().await)
    }

    /// Exchange the language selections. A displayed translation becomes the
    /// new source text; without one the source text is emptied. No request
    /// is issued.
    pub fn swap_languages(&self) {
        self.invalidate_pending();

        let label = {
            let mut form = lock(&self.form);
            let detected = form
                .result
                .as_ref()
                .and_then(|r| r.detected_source_language.clone());
            let old_source = std::mem::take(&mut form.source_language);
            let old_target = std::mem::take(&mut form.target_language);

            form.source_language = if LanguageCatalog::is_auto(&old_target) {
                AUTO_DETECT.to_string()
            } else {
                old_target
            };
            // An auto-detected source swaps in as whatever was detected
            form.target_language = if LanguageCatalog::is_auto(&old_source) {
                detected.unwrap_or_default()
            } else {
                old_source
            };
            form.source_text = form
                .result
                .take()
                .map(|r| r.translated_text)
                .unwrap_or_default();
            form.source_label = LanguageCatalog::name_of(&form.source_language);

            debug!("Swapped languages: {} -> {}", form.source_language, form.target_language);
            form.source_label.clone()
        };

        self.display.clear_result();
        self.display.show_source_label(&label);
    }

    /// Empty the source text and the result on display
    pub fn clear_input(&self) {
        self.invalidate_pending();
        {
            let mut form = lock(&self.form);
            form.source_text.clear();
            form.result = None;
        }
        self.display.clear_result();
    }

    /// Ask the backend which language the current source text is in and
    /// update the source label. The selection itself is left alone.
    pub async fn detect_source_language(&self) -> Result<DetectedLanguage> {
        let text = lock(&self.form).source_text.trim().to_string();
        if text.is_empty() {
            return Err(LingoError::Validation("Text is required for language detection".to_string()));
        }

        let detected = self.backend.detect_language(&text).await?;
        let name = detected
            .language_name
            .clone()
            .unwrap_or_else(|| LanguageCatalog::name_of(&detected.detected_language));
        self.update_source_label(format!("{} (detected)", name));
        Ok(detected)
    }

    fn apply_success(&self, request: &TranslateRequest, translation: Translation) -> SessionResult {
        let detected = translation
            .source_language
            .clone()
            .or_else(|| request.source_lang.clone());
        let target = translation
            .target_language
            .clone()
            .or_else(|| request.target_lang.clone());

        let result = SessionResult {
            translated_text: translation.text,
            detected_source_language: detected.clone(),
            resolved_target_language: target.clone(),
            model_name: translation.model_name,
            success: true,
            error: None,
        };
        self.transition(SessionState::Succeeded);

        let saved = {
            let mut history = lock(&self.history);
            let entry = HistoryEntry::new(
                history.next_id(),
                request.text.clone(),
                result.translated_text.clone(),
                detected.clone().unwrap_or_else(|| AUTO_DETECT.to_string()),
                target.unwrap_or_default(),
                result.model_name.clone(),
            );
            history.append(entry)
        };
        if let Err(e) = saved {
            warn!("Failed to save translation history: {}", e);
            self.display.show_error("The translation could not be saved to history");
        }

        if request.auto_detect {
            if let Some(code) = &detected {
                let name = translation
                    .source_language_name
                    .unwrap_or_else(|| LanguageCatalog::name_of(code));
                self.update_source_label(format!("{} (detected)", name));
            }
        }

        lock(&self.form).result = Some(result.clone());
        self.display.show_translation(&result);
        result
    }

    /// The error notice replaces any earlier translation on display
    fn apply_failure(&self, message: String) -> SessionResult {
        self.transition(SessionState::Failed);
        lock(&self.form).result = None;
        self.display.clear_result();
        self.display.show_error(&message);

        SessionResult {
            translated_text: String::new(),
            detected_source_language: None,
            resolved_target_language: None,
            model_name: None,
            success: false,
            error: Some(message),
        }
    }

    fn update_source_label(&self, label: String) {
        lock(&self.form).source_label = label.clone();
        self.display.show_source_label(&label);
    }

    fn invalidate_pending(&self) {
        if self.flight.is_busy() {
            debug!("Outstanding translate response will be ignored");
        }
        self.sequence.fetch_add(1, Ordering::SeqCst);
    }

    fn transition(&self, state: SessionState) {
        *lock(&self.state) = state;
        debug!("Translation session -> {:?}", state);
        self.display.state_changed(state);
    }
}

fn source_or_auto(code: &str) -> &str {
    if LanguageCatalog::is_auto(code) { AUTO_DETECT } else { code }
}
