use thiserror::Error;

#[derive(Error, Debug)]
pub enum LingoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("A {0} request is already in flight")]
    Busy(&'static str),

    #[error("History entry not found: {0}")]
    EntryNotFound(u64),
}

impl LingoError {
    /// Text suitable for a transient user-facing notice.
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(message) if !message.trim().is_empty() => message.clone(),
            Self::Backend(_) => "Translation failed".to_string(),
            Self::Http(_) | Self::Network(_) => {
                "Network error. Please check the connection and try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LingoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_is_shown_verbatim() {
        let err = LingoError::Backend("model busy".to_string());
        assert_eq!(err.user_message(), "model busy");
    }

    #[test]
    fn test_blank_backend_message_falls_back() {
        let err = LingoError::Backend("  ".to_string());
        assert_eq!(err.user_message(), "Translation failed");
    }

    #[test]
    fn test_network_errors_are_generic() {
        let err = LingoError::Network("connection reset by peer".to_string());
        assert!(err.user_message().starts_with("Network error"));
    }
}
