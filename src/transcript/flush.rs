//! Flush scheduler: decides when the settled transcript goes to the note.
//!
//! Two triggers: a new settled sentence (immediate flush) and a periodic
//! fallback timer. The cursor only advances when the publisher reports
//! success, so a failed sync is retried on the next tick with the full
//! current transcript. Flushing is full-replace; the cursor gates *when*
//! to publish, never *what subset*.

use crate::defaults;
use std::time::{Duration, Instant};

/// Outcome of a scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushDecision {
    /// Publish the entire settled transcript now.
    Flush,
    /// Nothing to do this tick.
    Skip,
}

/// Sync cursor plus the decision logic around it.
#[derive(Debug)]
pub struct FlushScheduler {
    interval: Duration,
    last_flush: Instant,
    last_flushed_chars: usize,
}

impl FlushScheduler {
    /// Create a scheduler with the default flush interval.
    pub fn new(now: Instant) -> Self {
        Self::with_interval(now, defaults::FLUSH_INTERVAL)
    }

    /// Create a scheduler with a custom flush interval.
    pub fn with_interval(now: Instant, interval: Duration) -> Self {
        Self {
            interval,
            last_flush: now,
            last_flushed_chars: 0,
        }
    }

    /// Decide whether to flush.
    ///
    /// `Flush` iff the settled transcript is non-empty AND either a new
    /// sentence just settled or the interval elapsed since the last
    /// successful flush.
    pub fn tick(&self, now: Instant, settled_chars: usize, has_new_settled: bool) -> FlushDecision {
        if settled_chars == 0 {
            return FlushDecision::Skip;
        }
        if has_new_settled || now.duration_since(self.last_flush) >= self.interval {
            FlushDecision::Flush
        } else {
            FlushDecision::Skip
        }
    }

    /// Record a successful publish of `settled_chars` characters.
    ///
    /// Only success advances the cursor; failures leave it untouched so the
    /// next tick retries.
    pub fn record_success(&mut self, now: Instant, settled_chars: usize) {
        debug_assert!(settled_chars >= self.last_flushed_chars);
        self.last_flush = now;
        self.last_flushed_chars = settled_chars;
    }

    /// Characters of settled transcript already on the remote note.
    pub fn flushed_chars(&self) -> usize {
        self.last_flushed_chars
    }

    /// Characters settled but not yet confirmed remote.
    pub fn pending_chars(&self, settled_chars: usize) -> usize {
        settled_chars.saturating_sub(self.last_flushed_chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(5);

    fn scheduler(now: Instant) -> FlushScheduler {
        FlushScheduler::with_interval(now, INTERVAL)
    }

    #[test]
    fn test_never_flushes_empty_transcript() {
        let t0 = Instant::now();
        let s = scheduler(t0);

        assert_eq!(s.tick(t0, 0, false), FlushDecision::Skip);
        // Even with the new-text flag or a long-elapsed interval
        assert_eq!(s.tick(t0, 0, true), FlushDecision::Skip);
        assert_eq!(
            s.tick(t0 + Duration::from_secs(60), 0, false),
            FlushDecision::Skip
        );
    }

    #[test]
    fn test_new_settled_text_flushes_immediately() {
        let t0 = Instant::now();
        let s = scheduler(t0);

        // No time has passed at all
        assert_eq!(s.tick(t0, 10, true), FlushDecision::Flush);
    }

    #[test]
    fn test_interval_elapse_flushes_without_new_text() {
        let t0 = Instant::now();
        let s = scheduler(t0);

        assert_eq!(
            s.tick(t0 + Duration::from_secs(6), 1, false),
            FlushDecision::Flush
        );
    }

    #[test]
    fn test_within_interval_without_new_text_skips() {
        let t0 = Instant::now();
        let s = scheduler(t0);

        assert_eq!(
            s.tick(t0 + Duration::from_secs(2), 10, false),
            FlushDecision::Skip
        );
    }

    #[test]
    fn test_success_advances_cursor() {
        let t0 = Instant::now();
        let mut s = scheduler(t0);
        let t1 = t0 + Duration::from_secs(6);

        assert_eq!(s.tick(t1, 3, false), FlushDecision::Flush);
        s.record_success(t1, 3);

        assert_eq!(s.flushed_chars(), 3);
        assert_eq!(s.pending_chars(3), 0);
        // Timer restarted: next periodic flush is a full interval away
        assert_eq!(
            s.tick(t1 + Duration::from_secs(2), 3, false),
            FlushDecision::Skip
        );
        assert_eq!(
            s.tick(t1 + Duration::from_secs(5), 3, false),
            FlushDecision::Flush
        );
    }

    #[test]
    fn test_failure_leaves_cursor_and_retries() {
        let t0 = Instant::now();
        let mut s = scheduler(t0);
        let t1 = t0 + Duration::from_secs(6);

        assert_eq!(s.tick(t1, 4, false), FlushDecision::Flush);
        // Publisher failed: record_success NOT called

        // The very next tick still wants to flush the full transcript
        assert_eq!(s.tick(t1 + Duration::from_millis(1), 4, false), FlushDecision::Flush);
        assert_eq!(s.pending_chars(4), 4);

        // Eventually it succeeds, cursor catches up
        let t2 = t1 + Duration::from_secs(1);
        s.record_success(t2, 4);
        assert_eq!(s.pending_chars(4), 0);
    }

    #[test]
    fn test_empty_then_elapsed_single_char() {
        // tick(t0, false) with empty settled -> Skip;
        // tick(t0+6s, false) with settled="A", last_flush=t0 -> Flush
        let t0 = Instant::now();
        let s = scheduler(t0);

        assert_eq!(s.tick(t0, 0, false), FlushDecision::Skip);
        assert_eq!(
            s.tick(t0 + Duration::from_secs(6), 1, false),
            FlushDecision::Flush
        );
    }

    #[test]
    fn test_pending_chars_grows_with_settled_text() {
        let t0 = Instant::now();
        let mut s = scheduler(t0);

        s.record_success(t0, 5);
        assert_eq!(s.pending_chars(9), 4);
    }
}
