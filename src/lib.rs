//! livenote - live voice transcription published to a remote note
//!
//! Streams microphone audio to a remote recognition service and keeps a
//! remote note in sync with the settled transcript.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod asr;
pub mod audio;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod diagnostics;
pub mod error;
pub mod note;
pub mod session;
pub mod status;
pub mod transcript;

// L4 composition root - needs everything
pub mod app;

// Core seams (source → session → sink)
pub use audio::source::AudioSource;
pub use note::NotePublisher;

// Core state machines
pub use session::{BackoffPolicy, ConnectionState, SessionDriver};
pub use transcript::{AssemblerAction, FlushDecision, FlushScheduler, TranscriptAssembler};

// Error handling
pub use error::{LivenoteError, Result};

// Config
pub use config::{Config, Secrets};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.2+abc1234"` when git hash is available, `"0.1.2"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
