use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

use crate::api::{HttpBackend, TranslationBackend};
use crate::config::Config;
use crate::display::DisplayAdapter;
use crate::error::Result;
use crate::history::{FileStorage, HistoryEntry, HistoryStore, RecordStorage};
use crate::model::ModelSelector;
use crate::session::TranslationSession;

/// Everything the front end talks to, built once at startup
pub struct AppContext {
    pub config: Config,
    pub backend: Arc<dyn TranslationBackend>,
    pub session: TranslationSession,
    pub models: ModelSelector,
    history: Arc<Mutex<HistoryStore>>,
}

impl AppContext {
    /// HTTP backend plus file-backed history, as configured
    pub fn new(config: Config, display: Arc<dyn DisplayAdapter>) -> Result<Self> {
        let backend = Arc::new(HttpBackend::new(config.api.clone())?);
        let storage = Box::new(FileStorage::new(&config.history.dir));
        Ok(Self::with_parts(config, backend, storage, display))
    }

    pub fn with_parts(
        config: Config,
        backend: Arc<dyn TranslationBackend>,
        storage: Box<dyn RecordStorage>,
        display: Arc<dyn DisplayAdapter>,
    ) -> Self {
        let mut store = HistoryStore::new(storage, config.history.key.clone(), config.history.max_entries);
        store.load();
        let history = Arc::new(Mutex::new(store));

        let session = TranslationSession::new(backend.clone(), history.clone(), display, &config.session);
        let models = ModelSelector::new(backend.clone());

        info!("Translation client ready ({})", config.api.base_url);
        Self {
            config,
            backend,
            session,
            models,
            history,
        }
    }

    fn history(&self) -> MutexGuard<'_, HistoryStore> {
        self.history.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Most recent first
    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.history().list().to_vec()
    }

    pub fn remove_history_entry(&self, id: u64) -> Result<bool> {
        self.history().remove(id)
    }

    /// Callers confirm with the user before calling this
    pub fn clear_history(&self) -> Result<()> {
        self.history().clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockTranslationBackend, TranslateOutcome, Translation};
    use crate::history::MemoryStorage;
    use crate::session::{Completion, SessionResult};

    struct QuietDisplay;

    impl DisplayAdapter for QuietDisplay {
        fn show_translation(&self, _result: &SessionResult) {}
        fn show_error(&self, _message: &str) {}
    }

    fn backend() -> Arc<MockTranslationBackend> {
        let mut backend = MockTranslationBackend::new();
        backend.expect_translate().returning(|request| {
            Ok(TranslateOutcome::Success(Translation {
                text: format!("[de] {}", request.text),
                source_language: Some("en".to_string()),
                target_language: Some("de".to_string()),
                model_name: Some("NLLB-200-600M-distilled".to_string()),
                ..Translation::default()
            }))
        });
        Arc::new(backend)
    }

    fn context(storage: &MemoryStorage, config: Config) -> AppContext {
        AppContext::with_parts(config, backend(), Box::new(storage.clone()), Arc::new(QuietDisplay))
    }

    #[tokio::test]
    async fn test_history_survives_restart() {
        let storage = MemoryStorage::new();
        let app = context(&storage, Config::default());
        for text in ["one", "two", "three"] {
            app.session.set_source_text(text);
            assert!(matches!(app.session.translate().await, Completion::Finished(_)));
        }
        let before = app.history_entries();
        drop(app);

        let restarted = context(&storage, Config::default());
        assert_eq!(restarted.history_entries(), before);
        assert_eq!(restarted.history_entries()[0].source_text, "three");
        assert_eq!(restarted.history_entries()[0].model_name.as_deref(), Some("NLLB-200-600M-distilled"));
    }

    #[tokio::test]
    async fn test_configured_cap_applies() {
        let storage = MemoryStorage::new();
        let mut config = Config::default();
        config.history.max_entries = 10;
        let app = context(&storage, config);

        for i in 0..12 {
            app.session.set_source_text(format!("text {}", i));
            app.session.translate().await;
        }

        let entries = app.history_entries();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].source_text, "text 11");
        assert_eq!(entries[9].source_text, "text 2");
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let storage = MemoryStorage::new();
        let app = context(&storage, Config::default());
        app.session.set_source_text("keep me");
        app.session.translate().await;
        app.session.set_source_text("drop me");
        app.session.translate().await;

        let drop_id = app.history_entries()[0].id;
        assert!(app.remove_history_entry(drop_id).unwrap());
        assert_eq!(app.history_entries().len(), 1);

        app.clear_history().unwrap();
        let restarted = context(&storage, Config::default());
        assert!(restarted.history_entries().is_empty());
    }
}
