//! Error types for livenote.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LivenoteError {
    // Configuration errors — fatal at startup
    #[error("Missing required environment variable {name}. {hint}")]
    ConfigMissingSecret { name: String, hint: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio capture errors — fatal at startup
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Recognition session errors — recoverable, drive the reconnect loop
    #[error("Token request failed: {message}")]
    Auth { message: String },

    #[error("Recognition socket error: {message}")]
    Transport { message: String },

    #[error("Recognition service error: {detail}")]
    Service { detail: String },

    // Malformed inbound message — logged and skipped, never tears down
    #[error("Failed to decode recognition message: {message}")]
    Decode { message: String },

    // Note sync errors — surfaced in status, retried on the next tick
    #[error("Note update failed: {message}")]
    Sync { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl LivenoteError {
    /// True for errors the session driver resolves with backoff-and-retry
    /// rather than propagating to process exit.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LivenoteError::Auth { .. }
                | LivenoteError::Transport { .. }
                | LivenoteError::Service { .. }
                | LivenoteError::Decode { .. }
                | LivenoteError::Sync { .. }
        )
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, LivenoteError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_missing_secret_display() {
        let error = LivenoteError::ConfigMissingSecret {
            name: "LIVENOTE_ASR_KEY".to_string(),
            hint: "Set it to your recognition service API key.".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Missing required environment variable LIVENOTE_ASR_KEY. \
             Set it to your recognition service API key."
        );
    }

    #[test]
    fn test_config_parse_display() {
        let error = LivenoteError::ConfigParse {
            message: "invalid TOML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration: invalid TOML syntax"
        );
    }

    #[test]
    fn test_audio_device_not_found_display() {
        let error = LivenoteError::AudioDeviceNotFound {
            device: "default".to_string(),
        };
        assert_eq!(error.to_string(), "Audio device not found: default");
    }

    #[test]
    fn test_auth_display() {
        let error = LivenoteError::Auth {
            message: "token endpoint returned 403".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Token request failed: token endpoint returned 403"
        );
    }

    #[test]
    fn test_transport_display() {
        let error = LivenoteError::Transport {
            message: "connection reset".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Recognition socket error: connection reset"
        );
    }

    #[test]
    fn test_service_display() {
        let error = LivenoteError::Service {
            detail: "pipeline unavailable".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Recognition service error: pipeline unavailable"
        );
    }

    #[test]
    fn test_sync_display() {
        let error = LivenoteError::Sync {
            message: "note endpoint returned 500".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Note update failed: note endpoint returned 500"
        );
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(
            LivenoteError::Auth {
                message: String::new()
            }
            .is_recoverable()
        );
        assert!(
            LivenoteError::Transport {
                message: String::new()
            }
            .is_recoverable()
        );
        assert!(
            LivenoteError::Service {
                detail: String::new()
            }
            .is_recoverable()
        );
        assert!(
            LivenoteError::Sync {
                message: String::new()
            }
            .is_recoverable()
        );
        assert!(
            !LivenoteError::ConfigMissingSecret {
                name: String::new(),
                hint: String::new()
            }
            .is_recoverable()
        );
        assert!(
            !LivenoteError::AudioDeviceNotFound {
                device: String::new()
            }
            .is_recoverable()
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: LivenoteError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_str = "invalid = toml = syntax";
        let toml_error = toml::from_str::<toml::Value>(toml_str).unwrap_err();
        let error: LivenoteError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<LivenoteError>();
        assert_sync::<LivenoteError>();
    }
}
