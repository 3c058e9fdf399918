use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

const UNKNOWN: &str = "Unknown";

/// Body of `POST /api/translate/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
    pub auto_detect: bool,
}

/// Canonical result of a successful translation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Translation {
    pub text: String,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
    pub source_language_name: Option<String>,
    pub target_language_name: Option<String>,
    pub model_name: Option<String>,
    pub device: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateOutcome {
    Success(Translation),
    Failure { message: String },
}

/// Every translate response shape the backends have produced
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTranslateResponse {
    #[serde(default)]
    pub translated_text: Option<String>,
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub source_language: Option<String>,
    #[serde(default)]
    pub target_language: Option<String>,
    #[serde(default)]
    pub source_language_name: Option<String>,
    #[serde(default)]
    pub target_language_name: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub device_used: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    /// Framework-level error field
    #[serde(default)]
    pub detail: Option<String>,
}

impl RawTranslateResponse {
    fn error_message(&self) -> Option<String> {
        self.error
            .as_ref()
            .or(self.detail.as_ref())
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }

    pub fn into_outcome(self) -> TranslateOutcome {
        if self.success == Some(false) || self.error_message().is_some() {
            return TranslateOutcome::Failure {
                message: self.error_message().unwrap_or_else(|| "Translation failed".to_string()),
            };
        }

        let text = match self.translated_text.or(self.translation) {
            Some(text) if !text.trim().is_empty() => text,
            Some(_) => {
                return TranslateOutcome::Failure {
                    message: "Empty translation received".to_string(),
                };
            }
            None => {
                return TranslateOutcome::Failure {
                    message: "Translation failed".to_string(),
                };
            }
        };

        TranslateOutcome::Success(Translation {
            text,
            source_language: self.source_language,
            target_language: self.target_language,
            source_language_name: self.source_language_name,
            target_language_name: self.target_language_name,
            model_name: self.model_name,
            device: self.device_used,
        })
    }
}

/// Body of `GET /api/model-info/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default = "unknown")]
    pub current_model: String,
    #[serde(default = "unknown")]
    pub device: String,
    #[serde(default)]
    pub compute_type: Option<String>,
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub available_models: Vec<String>,
    #[serde(default)]
    pub supported_languages: BTreeMap<String, String>,
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    Switched {
        current_model: String,
        device: String,
        message: Option<String>,
    },
    Rejected { message: String },
}

/// Nested (`model_info`) and flat switch-model response shapes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSwitchResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub model_info: Option<ModelInfo>,
    #[serde(default)]
    pub current_model: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl RawSwitchResponse {
    pub fn into_outcome(self) -> SwitchOutcome {
        let error = self.error.filter(|e| !e.trim().is_empty());
        if self.success == Some(false) || error.is_some() {
            return SwitchOutcome::Rejected {
                message: error.unwrap_or_else(|| "Failed to switch model".to_string()),
            };
        }

        match (self.model_info, self.current_model) {
            (Some(info), _) => SwitchOutcome::Switched {
                current_model: info.current_model,
                device: info.device,
                message: self.message,
            },
            (None, Some(current_model)) => SwitchOutcome::Switched {
                current_model,
                device: self.device.unwrap_or_else(unknown),
                message: self.message,
            },
            (None, None) => SwitchOutcome::Rejected {
                message: "Failed to switch model".to_string(),
            },
        }
    }
}

/// Body of `POST /api/detect-language/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedLanguage {
    pub detected_language: String,
    #[serde(default)]
    pub language_name: Option<String>,
    #[serde(default)]
    pub confidence: Option<String>,
}

/// Body of `GET /api/health/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub model_loaded: Option<bool>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// Error payload shared by every endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn message(self) -> Option<String> {
        self.error.or(self.detail).filter(|m| !m.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn translate_outcome(value: serde_json::Value) -> TranslateOutcome {
        serde_json::from_value::<RawTranslateResponse>(value).unwrap().into_outcome()
    }

    fn switch_outcome(value: serde_json::Value) -> SwitchOutcome {
        serde_json::from_value::<RawSwitchResponse>(value).unwrap().into_outcome()
    }

    #[test]
    fn test_request_serializes_nulls() {
        let request = TranslateRequest {
            text: "Hello world".to_string(),
            source_lang: None,
            target_lang: Some("de".to_string()),
            auto_detect: true,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"text": "Hello world", "source_lang": null, "target_lang": "de", "auto_detect": true})
        );
    }

    #[test]
    fn test_full_success_payload() {
        let outcome = translate_outcome(json!({
            "translated_text": "Hallo Welt",
            "source_language": "en",
            "target_language": "de",
            "source_language_name": "English",
            "target_language_name": "German",
            "model_name": "NLLB-200-600M-distilled",
            "device_used": "cuda",
            "success": true
        }));

        match outcome {
            TranslateOutcome::Success(t) => {
                assert_eq!(t.text, "Hallo Welt");
                assert_eq!(t.source_language.as_deref(), Some("en"));
                assert_eq!(t.model_name.as_deref(), Some("NLLB-200-600M-distilled"));
                assert_eq!(t.device.as_deref(), Some("cuda"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_translation_field_without_success_flag() {
        let outcome = translate_outcome(json!({"translation": "Good morning"}));
        assert!(matches!(outcome, TranslateOutcome::Success(ref t) if t.text == "Good morning"));
    }

    #[test]
    fn test_translated_text_wins_over_translation() {
        let outcome = translate_outcome(json!({"translated_text": "a", "translation": "b"}));
        assert!(matches!(outcome, TranslateOutcome::Success(ref t) if t.text == "a"));
    }

    #[test]
    fn test_explicit_failure() {
        let outcome = translate_outcome(json!({
            "translated_text": "",
            "error": "OpenNMT translation model not initialized",
            "success": false
        }));
        assert_eq!(
            outcome,
            TranslateOutcome::Failure { message: "OpenNMT translation model not initialized".to_string() }
        );
    }

    #[test]
    fn test_success_false_without_message() {
        let outcome = translate_outcome(json!({"translated_text": "x", "success": false}));
        assert_eq!(outcome, TranslateOutcome::Failure { message: "Translation failed".to_string() });
    }

    #[test]
    fn test_empty_text_is_failure() {
        let outcome = translate_outcome(json!({"translated_text": "   ", "success": true}));
        assert!(matches!(outcome, TranslateOutcome::Failure { .. }));
    }

    #[test]
    fn test_missing_text_is_failure() {
        let outcome = translate_outcome(json!({"source_language": "en"}));
        assert!(matches!(outcome, TranslateOutcome::Failure { .. }));
    }

    #[test]
    fn test_nested_switch_response() {
        let outcome = switch_outcome(json!({
            "success": true,
            "message": "Successfully switched to NLLB-200-1.3B-distilled",
            "model_info": {"current_model": "NLLB-200-1.3B-distilled", "device": "cpu"}
        }));
        assert_eq!(
            outcome,
            SwitchOutcome::Switched {
                current_model: "NLLB-200-1.3B-distilled".to_string(),
                device: "cpu".to_string(),
                message: Some("Successfully switched to NLLB-200-1.3B-distilled".to_string()),
            }
        );
    }

    #[test]
    fn test_flat_switch_response() {
        let outcome = switch_outcome(json!({"current_model": "NLLB-200-3.3B"}));
        assert!(matches!(
            outcome,
            SwitchOutcome::Switched { ref current_model, ref device, .. }
                if current_model == "NLLB-200-3.3B" && device == "Unknown"
        ));
    }

    #[test]
    fn test_rejected_switch_response() {
        let outcome = switch_outcome(json!({"success": false, "error": "model busy"}));
        assert_eq!(outcome, SwitchOutcome::Rejected { message: "model busy".to_string() });
    }

    #[test]
    fn test_model_info_defaults() {
        let info: ModelInfo = serde_json::from_value(json!({"device": "cuda"})).unwrap();
        assert_eq!(info.current_model, "Unknown");
        assert!(info.available_models.is_empty());
    }

    #[test]
    fn test_health_status() {
        let health: HealthStatus = serde_json::from_value(json!({
            "status": "healthy", "model_loaded": true, "device": "cpu", "model_type": "OpenNMT v3"
        })).unwrap();
        assert!(health.is_healthy());
    }
}
