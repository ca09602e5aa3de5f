use crate::defaults;
use crate::error::{LivenoteError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub asr: AsrConfig,
    pub note: NoteConfig,
    pub sync: SyncConfig,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
}

/// Recognition service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AsrConfig {
    pub pipeline: String,
    pub token_url: String,
    pub ws_url: String,
}

/// Note-hosting API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoteConfig {
    pub api_url: String,
}

/// Flush and reconnect tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds between periodic flushes of the settled transcript.
    pub flush_interval_secs: u64,
    /// Base delay in seconds between reconnection attempts.
    pub reconnect_backoff_secs: u64,
    /// Grow the reconnect delay exponentially instead of keeping it fixed.
    pub exponential_backoff: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

impl Default for AsrConfig {
    fn default() -> Self {
        Self {
            pipeline: defaults::ASR_PIPELINE.to_string(),
            token_url: defaults::ASR_TOKEN_URL.to_string(),
            ws_url: defaults::ASR_WS_URL.to_string(),
        }
    }
}

impl Default for NoteConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::NOTE_API_URL.to_string(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            flush_interval_secs: defaults::FLUSH_INTERVAL.as_secs(),
            reconnect_backoff_secs: defaults::RECONNECT_BACKOFF.as_secs(),
            exponential_backoff: false,
        }
    }
}

impl SyncConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }

    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_secs(self.reconnect_backoff_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    /// Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file doesn't exist
    ///
    /// Only returns defaults if the file is missing; invalid TOML is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(LivenoteError::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Reject values the rest of the program cannot work with.
    fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(LivenoteError::ConfigInvalidValue {
                key: "audio.sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.sync.flush_interval_secs == 0 {
            return Err(LivenoteError::ConfigInvalidValue {
                key: "sync.flush_interval_secs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - LIVENOTE_AUDIO_DEVICE → audio.device
    /// - LIVENOTE_PIPELINE → asr.pipeline
    /// - LIVENOTE_FLUSH_INTERVAL → sync.flush_interval_secs (seconds)
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(device) = std::env::var("LIVENOTE_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        if let Ok(pipeline) = std::env::var("LIVENOTE_PIPELINE")
            && !pipeline.is_empty()
        {
            self.asr.pipeline = pipeline;
        }

        if let Ok(interval) = std::env::var("LIVENOTE_FLUSH_INTERVAL")
            && let Ok(secs) = interval.parse::<u64>()
            && secs > 0
        {
            self.sync.flush_interval_secs = secs;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/livenote/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("livenote")
            .join("config.toml")
    }
}

/// The three secrets the process cannot run without.
///
/// Environment-only on purpose: they never belong in the config file.
#[derive(Debug, Clone)]
pub struct Secrets {
    /// API key for the recognition service's token endpoint.
    pub asr_key: String,
    /// Bearer token for the note-hosting API.
    pub note_token: String,
    /// Identifier of the note that receives the transcript.
    pub note_id: String,
}

impl Secrets {
    pub const ASR_KEY_VAR: &'static str = "LIVENOTE_ASR_KEY";
    pub const NOTE_TOKEN_VAR: &'static str = "LIVENOTE_NOTE_TOKEN";
    pub const NOTE_ID_VAR: &'static str = "LIVENOTE_NOTE_ID";

    /// Read all three secrets from the environment.
    ///
    /// # Errors
    /// Returns `ConfigMissingSecret` naming the first absent variable.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            asr_key: require_env(
                Self::ASR_KEY_VAR,
                "Set it to your recognition service API key.",
            )?,
            note_token: require_env(
                Self::NOTE_TOKEN_VAR,
                "Set it to your note-hosting API token.",
            )?,
            note_id: require_env(
                Self::NOTE_ID_VAR,
                "Set it to the id of the note that should receive the transcript.",
            )?,
        })
    }
}

fn require_env(name: &str, hint: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(LivenoteError::ConfigMissingSecret {
            name: name.to_string(),
            hint: hint.to_string(),
        }),
    }
}
