use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

use crate::api::{ModelInfo, SwitchOutcome, TranslationBackend};
use crate::error::{Result, LingoError};
use crate::latch::SingleFlight;

const UNKNOWN: &str = "Unknown";
const ERROR: &str = "Error";

/// Which backend model is active, as last confirmed by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelState {
    pub current_model_index: usize,
    pub current_model_name: String,
    pub device_descriptor: String,
    pub available_models: Vec<String>,
}

impl Default for ModelState {
    fn default() -> Self {
        Self {
            current_model_index: 0,
            current_model_name: UNKNOWN.to_string(),
            device_descriptor: UNKNOWN.to_string(),
            available_models: Vec::new(),
        }
    }
}

pub struct ModelSelector {
    backend: Arc<dyn TranslationBackend>,
    state: Mutex<ModelState>,
    flight: SingleFlight,
}

impl ModelSelector {
    pub fn new(backend: Arc<dyn TranslationBackend>) -> Self {
        Self {
            backend,
            state: Mutex::new(ModelState::default()),
            flight: SingleFlight::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ModelState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> ModelState {
        self.lock().clone()
    }

    /// Last index the backend confirmed
    pub fn current_index(&self) -> usize {
        self.lock().current_model_index
    }

    /// Fetch model info. On failure the names read "Error" and the error is
    /// returned for display.
    pub async fn refresh(&self) -> Result<ModelInfo> {
        match self.backend.model_info().await {
            Ok(info) => {
                let mut state = self.lock();
                state.current_model_name = info.current_model.clone();
                state.device_descriptor = info.device.clone();
                state.available_models = info.available_models.clone();
                info!("Backend model: {} on {}", info.current_model, info.device);
                Ok(info)
            }
            Err(e) => {
                warn!("Failed to fetch model info: {}", e);
                let mut state = self.lock();
                state.current_model_name = ERROR.to_string();
                state.device_descriptor = ERROR.to_string();
                Err(e)
            }
        }
    }

    /// Ask the backend to switch models. The state only changes once the
    /// backend confirms.
    pub async fn switch_to(&self, index: usize) -> Result<ModelState> {
        {
            let state = self.lock();
            if !state.available_models.is_empty() && index >= state.available_models.len() {
                return Err(LingoError::Validation(format!(
                    "model index must be between 0 and {}",
                    state.available_models.len() - 1
                )));
            }
        }

        let Some(_flight) = self.flight.try_acquire() else {
            return Err(LingoError::Busy("model switch"));
        };

        info!("Switching to model #{}", index);
        match self.backend.switch_model(index).await? {
            SwitchOutcome::Switched { current_model, device, message } => {
                let mut state = self.lock();
                state.current_model_index = index;
                state.current_model_name = current_model;
                state.device_descriptor = device;
                info!(
                    "{}",
                    message.unwrap_or_else(|| format!("Switched to {}", state.current_model_name))
                );
                Ok(state.clone())
            }
            SwitchOutcome::Rejected { message } => {
                warn!("Model switch rejected: {}", message);
                Err(LingoError::Backend(message))
            }
        }
    }
}
