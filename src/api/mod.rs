// Translation service API
//
// The backend is reached through a small async trait so the session and the
// model selector can be driven by the HTTP client or by test doubles. Raw
// JSON is turned into tagged outcomes here and nowhere else.

pub mod http;
pub mod types;

use async_trait::async_trait;

pub use http::HttpBackend;
pub use types::*;
use crate::error::Result;

/// Operations exposed by the translation service.
///
/// `Err` means the call itself failed (network, unreadable body).
/// Backend-reported failures come back as `Ok` with a failure outcome.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn translate(&self, request: &TranslateRequest) -> Result<TranslateOutcome>;

    async fn model_info(&self) -> Result<ModelInfo>;

    async fn switch_model(&self, model_index: usize) -> Result<SwitchOutcome>;

    async fn detect_language(&self, text: &str) -> Result<DetectedLanguage>;

    async fn health(&self) -> Result<HealthStatus>;
}
