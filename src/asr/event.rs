//! Decoder for the recognition service's inbound JSON messages.
//!
//! One raw message decodes to exactly one [`RecognitionEvent`]. Shapes the
//! decoder does not recognize map to [`RecognitionEvent::Unknown`] rather
//! than an error, so service-side additions never tear down a session.

use crate::error::{LivenoteError, Result};
use serde::Deserialize;

/// A typed recognition event, consumed exactly once by the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// A still-changing transcription of the current utterance.
    Partial { text: String },
    /// The finished transcription of the current utterance.
    Final { text: String },
    /// The service detected a pause in speech. Fallback finalize trigger.
    UtteranceEnd,
    /// The service accepted the connection; audio may be streamed.
    Ready,
    /// The service reported an error; the session must reconnect.
    ServiceError { detail: String },
    /// A shape this decoder does not recognize. Ignored downstream.
    Unknown,
}

/// Wire shape of an inbound message.
///
/// The service multiplexes fragment updates (`pipe`) and connection-level
/// status (`status`/`detail`) over one socket.
#[derive(Debug, Deserialize)]
struct WireMessage {
    pipe: Option<WirePipe>,
    status: Option<String>,
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WirePipe {
    asr_sentence: Option<String>,
    #[serde(default)]
    asr_final: bool,
    asr_state: Option<String>,
}

/// Decode one raw message into a recognition event.
///
/// # Errors
/// Returns `LivenoteError::Decode` only for malformed JSON. A syntactically
/// valid message always decodes, possibly to `Unknown`.
pub fn decode(raw: &str) -> Result<RecognitionEvent> {
    let message: WireMessage =
        serde_json::from_str(raw).map_err(|e| LivenoteError::Decode {
            message: format!("{} (message: {})", e, truncate_for_log(raw)),
        })?;

    if let Some(pipe) = message.pipe {
        // A present sentence wins over asr_state when both appear
        if let Some(text) = pipe.asr_sentence {
            if pipe.asr_final {
                return Ok(RecognitionEvent::Final { text });
            }
            return Ok(RecognitionEvent::Partial { text });
        }
        if pipe.asr_state.as_deref() == Some("utterance_end") {
            return Ok(RecognitionEvent::UtteranceEnd);
        }
        return Ok(RecognitionEvent::Unknown);
    }

    match message.status.as_deref() {
        Some("ok") => Ok(RecognitionEvent::Ready),
        Some("error") => Ok(RecognitionEvent::ServiceError {
            detail: message
                .detail
                .unwrap_or_else(|| "unspecified service error".to_string()),
        }),
        _ => Ok(RecognitionEvent::Unknown),
    }
}

/// Cap raw payloads quoted in decode diagnostics.
fn truncate_for_log(raw: &str) -> String {
    const MAX: usize = 120;
    if raw.chars().count() <= MAX {
        raw.to_string()
    } else {
        let head: String = raw.chars().take(MAX).collect();
        format!("{head}…")
    }
}
