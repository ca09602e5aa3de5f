//! Transcript assembler: partial/final recognition events in, settled
//! sentences out.
//!
//! State model:
//! - `settled`: finalized sentences, append-only for the life of the process.
//! - `in_flight`: the current utterance's latest partial text, replaced
//!   wholesale by each partial event and cleared on finalization.
//!
//! The service can finalize an utterance two ways: an explicit final
//! fragment, or an utterance-boundary signal while a partial is still
//! buffered. Both may fire for the same utterance; the boundary path only
//! appends when `in_flight` is non-empty, which makes double finalization
//! append exactly once.

use crate::asr::event::RecognitionEvent;

/// What the caller should do after feeding one event to the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerAction {
    /// The in-flight fragment changed; refresh the display, nothing to sync.
    DisplayUpdate,
    /// At least one new settled sentence exists; the scheduler should run.
    NewSettledText,
    /// Nothing relevant to transcript state happened.
    None,
}

/// Read-only copy of transcript state for the display and scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranscriptSnapshot {
    pub settled: Vec<String>,
    pub in_flight: String,
}

impl TranscriptSnapshot {
    /// The settled transcript as one newline-delimited body — the exact
    /// payload a flush publishes.
    pub fn joined(&self) -> String {
        self.settled.join("\n")
    }

    /// Total character count of the settled transcript body.
    pub fn settled_chars(&self) -> usize {
        self.joined().chars().count()
    }

    /// Last `max_chars` characters of the settled body, for the status view.
    pub fn tail(&self, max_chars: usize) -> String {
        let joined = self.joined();
        let count = joined.chars().count();
        if count <= max_chars {
            joined
        } else {
            joined.chars().skip(count - max_chars).collect()
        }
    }
}

/// Accumulates recognition events into settled sentences.
///
/// Owned exclusively by the session's receive duty; everyone else sees
/// snapshots.
#[derive(Debug, Default)]
pub struct TranscriptAssembler {
    settled: Vec<String>,
    in_flight: String,
}

impl TranscriptAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one decoded event; returns what changed.
    ///
    /// Events arrive in order and are consumed exactly once. Empty or
    /// whitespace-only fragments never become settled sentences.
    pub fn on_event(&mut self, event: RecognitionEvent) -> AssemblerAction {
        match event {
            RecognitionEvent::Partial { text } => {
                self.in_flight = text;
                AssemblerAction::DisplayUpdate
            }
            RecognitionEvent::Final { text } => {
                self.in_flight.clear();
                self.settle(text)
            }
            RecognitionEvent::UtteranceEnd => {
                // Fallback finalize: only when no final fragment arrived for
                // this utterance, so the double-finalize case appends once.
                if self.in_flight.is_empty() {
                    AssemblerAction::None
                } else {
                    let text = std::mem::take(&mut self.in_flight);
                    self.settle(text)
                }
            }
            RecognitionEvent::Ready
            | RecognitionEvent::ServiceError { .. }
            | RecognitionEvent::Unknown => AssemblerAction::None,
        }
    }

    fn settle(&mut self, text: String) -> AssemblerAction {
        if text.trim().is_empty() {
            return AssemblerAction::None;
        }
        self.settled.push(text);
        AssemblerAction::NewSettledText
    }

    /// Read-only copy of the current state.
    pub fn snapshot(&self) -> TranscriptSnapshot {
        TranscriptSnapshot {
            settled: self.settled.clone(),
            in_flight: self.in_flight.clone(),
        }
    }

    /// Number of settled sentences so far.
    pub fn settled_count(&self) -> usize {
        self.settled.len()
    }
}
