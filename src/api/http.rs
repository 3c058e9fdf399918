use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use super::TranslationBackend;
use super::types::*;
use crate::config::ApiConfig;
use crate::error::{Result, LingoError};

/// reqwest client for the Django translation service
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    jar: Arc<Jar>,
    config: ApiConfig,
    primed: AtomicBool,
}

impl HttpBackend {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| LingoError::Config(format!("Invalid api.base_url '{}': {}", config.base_url, e)))?;

        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .user_agent(concat!("lingo/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_provider(jar.clone())
            .build()?;

        Ok(Self {
            client,
            base_url,
            jar,
            config,
            primed: AtomicBool::new(false),
        })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/api/{}/", self.base_url.as_str().trim_end_matches('/'), name)
    }

    /// Token from the configuration, else from the session cookie
    fn csrf_token(&self) -> Option<String> {
        if let Some(token) = self.config.csrf_token.as_ref().filter(|t| !t.is_empty()) {
            return Some(token.clone());
        }

        let cookies = self.jar.cookies(&self.base_url)?;
        let cookies = cookies.to_str().ok()?;
        cookie_value(cookies, &self.config.csrf_cookie)
    }

    /// Fetch the index page once so the server can hand out its CSRF cookie.
    /// Failures are ignored; the POST goes out regardless.
    async fn prime_csrf_cookie(&self) {
        if self.config.csrf_token.is_some() || self.primed.swap(true, Ordering::SeqCst) {
            return;
        }
        match self.client.get(self.base_url.clone()).send().await {
            Ok(response) => debug!("Primed CSRF cookie (HTTP {})", response.status()),
            Err(e) => debug!("Could not prime CSRF cookie: {}", e),
        }
    }

    async fn get(&self, name: &str) -> Result<Response> {
        let url = self.endpoint(name);
        debug!("GET {}", url);
        self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| LingoError::Network(format!("HTTP request failed: {}", e)))
    }

    async fn post<T: Serialize + ?Sized>(&self, name: &str, body: &T) -> Result<Response> {
        self.prime_csrf_cookie().await;

        let url = self.endpoint(name);
        debug!("POST {}", url);
        let mut request = self.client.post(&url).json(body);
        match self.csrf_token() {
            Some(token) => request = request.header(self.config.csrf_header.as_str(), token),
            None => debug!("No CSRF token available, sending without one"),
        }

        request
            .send()
            .await
            .map_err(|e| LingoError::Network(format!("HTTP request failed: {}", e)))
    }
}

/// Read the body and decode it, turning non-2xx statuses into backend errors
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let (status, body) = read_body(response).await?;
    decode_body(status, &body)
}

/// A malformed 2xx body is reported like a transport failure; the serde
/// detail only goes to the log.
fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
    if !status.is_success() {
        return Err(LingoError::Backend(error_message(body, status.as_u16())));
    }

    serde_json::from_str(body).map_err(|e| {
        warn!("Malformed response body (HTTP {}): {}", status.as_u16(), e);
        LingoError::Network("Invalid response from translation service".to_string())
    })
}

fn translate_outcome(status: StatusCode, body: &str) -> Result<TranslateOutcome> {
    match decode_body::<RawTranslateResponse>(status, body) {
        Ok(raw) => Ok(raw.into_outcome()),
        Err(LingoError::Backend(message)) => Ok(TranslateOutcome::Failure { message }),
        Err(e) => Err(e),
    }
}

fn switch_outcome(status: StatusCode, body: &str) -> Result<SwitchOutcome> {
    match decode_body::<RawSwitchResponse>(status, body) {
        Ok(raw) => Ok(raw.into_outcome()),
        Err(LingoError::Backend(message)) => Ok(SwitchOutcome::Rejected { message }),
        Err(e) => Err(e),
    }
}

async fn read_body(response: Response) -> Result<(StatusCode, String)> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| LingoError::Network(format!("Failed to read response: {}", e)))?;
    Ok((status, body))
}

fn error_message(body: &str, status: u16) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::message)
        .unwrap_or_else(|| format!("Request failed with HTTP {}", status))
}

fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

#[async_trait]
impl TranslationBackend for HttpBackend {
    async fn translate(&self, request: &TranslateRequest) -> Result<TranslateOutcome> {
        let response = self.post("translate", request).await?;
        let (status, body) = read_body(response).await?;
        translate_outcome(status, &body)
    }

    async fn model_info(&self) -> Result<ModelInfo> {
        let response = self.get("model-info").await?;
        decode(response).await
    }

    async fn switch_model(&self, model_index: usize) -> Result<SwitchOutcome> {
        let response = self.post("switch-model", &json!({ "model_index": model_index })).await?;
        let (status, body) = read_body(response).await?;
        switch_outcome(status, &body)
    }

    async fn detect_language(&self, text: &str) -> Result<DetectedLanguage> {
        let response = self.post("detect-language", &json!({ "text": text })).await?;
        decode(response).await
    }

    async fn health(&self) -> Result<HealthStatus> {
        let response = self.get("health").await?;
        let (status, body) = read_body(response).await?;

        // The health endpoint reports "unhealthy" with a 500 and a regular body
        serde_json::from_str::<HealthStatus>(&body)
            .map_err(|_| LingoError::Backend(error_message(&body, status.as_u16())))
    }
}
