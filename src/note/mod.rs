//! Remote note publishing.
//!
//! The note side of livenote is deliberately dumb: the whole settled
//! transcript replaces the note body on every flush, so publishing is
//! idempotent and the sync cursor never has to track deltas.

pub mod hackmd;

use crate::error::Result;

pub use hackmd::HackmdPublisher;

/// Seam between the flush scheduler and the note-hosting API.
#[async_trait::async_trait]
pub trait NotePublisher: Send + Sync {
    /// Replace the remote note's entire content.
    ///
    /// Re-sending identical content is a no-op from the caller's view.
    ///
    /// # Errors
    /// Returns `LivenoteError::Sync` on transport or API failure. Never
    /// fatal; the scheduler retries on its next tick.
    async fn replace(&self, content: &str) -> Result<()>;
}
