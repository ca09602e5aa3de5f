//! Transcript assembly and synchronization: the part of livenote that owns
//! real state.
//!
//! The assembler turns the event stream into settled sentences; the flush
//! scheduler decides when the settled transcript goes to the remote note.
//! Both survive reconnects unchanged.

pub mod assembler;
pub mod flush;

pub use assembler::{AssemblerAction, TranscriptAssembler, TranscriptSnapshot};
pub use flush::{FlushDecision, FlushScheduler};
