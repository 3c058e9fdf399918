use tracing::debug;

use crate::api::HealthStatus;
use crate::language::LanguageCatalog;
use crate::session::{SessionResult, SessionState};

/// What the session needs from whatever renders it.
pub trait DisplayAdapter: Send + Sync {
    /// Called on every state transition; `Requesting` disables the trigger
    fn state_changed(&self, _state: SessionState) {}

    fn show_translation(&self, result: &SessionResult);

    /// Transient, dismissible failure notice
    fn show_error(&self, message: &str);

    /// Label next to the source selector, e.g. "English (detected)"
    fn show_source_label(&self, _label: &str) {}

    /// Back to the "no result" placeholder
    fn clear_result(&self) {}
}

/// Plain stdout/stderr rendering for the command line
#[derive(Debug, Default)]
pub struct TerminalDisplay {
    pub show_details: bool,
}

impl TerminalDisplay {
    pub fn new(show_details: bool) -> Self {
        Self { show_details }
    }
}

impl DisplayAdapter for TerminalDisplay {
    fn state_changed(&self, state: SessionState) {
        debug!("Session state: {:?}", state);
    }

    fn show_translation(&self, result: &SessionResult) {
        println!("{}", result.translated_text);

        if self.show_details {
            let source = result
                .detected_source_language
                .as_deref()
                .map(LanguageCatalog::name_of)
                .unwrap_or_else(|| "?".to_string());
            let target = result
                .resolved_target_language
                .as_deref()
                .map(LanguageCatalog::name_of)
                .unwrap_or_else(|| "?".to_string());
            println!();
            println!("{:<10} {} -> {}", "Languages", source, target);
            if let Some(model) = &result.model_name {
                println!("{:<10} {}", "Model", model);
            }
        }
    }

    fn show_error(&self, message: &str) {
        eprintln!("error: {}", message);
    }

    fn show_source_label(&self, label: &str) {
        debug!("Source label: {}", label);
    }
}

/// Health report as printed by `lingo health`
pub fn format_health(health: &HealthStatus) -> String {
    let mut lines = vec![format!("{:<8} {}", "Status:", health.status)];
    if let Some(loaded) = health.model_loaded {
        lines.push(format!("{:<8} {}", "Model:", if loaded { "loaded" } else { "not loaded" }));
    }
    if let Some(device) = &health.device {
        lines.push(format!("{:<8} {}", "Device:", device));
    }
    if let Some(error) = &health.error {
        lines.push(format!("{:<8} {}", "Error:", error));
    }
    lines.join("\n")
}
