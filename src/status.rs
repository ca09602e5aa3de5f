//! Live terminal status view.
//!
//! The core publishes immutable [`StatusSnapshot`] values through a watch
//! channel; an independent display task re-renders the latest one at a fixed
//! cadence. The display never feeds anything back into the core.

use crate::defaults;
use owo_colors::OwoColorize;
use std::io::{self, Write};
use tokio::sync::watch;

/// Clear the screen and home the cursor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Health of the remote note sync, as last observed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncHealth {
    /// No flush attempted yet.
    #[default]
    Idle,
    /// Last flush succeeded.
    Ok,
    /// Last flush failed; retrying on the next tick.
    Failed(String),
}

/// One immutable frame of program state for the display.
#[derive(Debug, Clone, Default)]
pub struct StatusSnapshot {
    /// Connection health line, e.g. "connected" or an error summary.
    pub connection: String,
    /// Name of the audio input device in use.
    pub device: String,
    /// Whether the microphone is currently picking up signal.
    pub signal_present: bool,
    /// The current unsettled fragment.
    pub in_flight: String,
    /// Tail of the settled transcript (last ~500 chars).
    pub settled_tail: String,
    /// Remote sync health.
    pub sync: SyncHealth,
}

impl StatusSnapshot {
    /// Render the snapshot as the full-screen status view.
    pub fn render(&self) -> String {
        let sync_line = match &self.sync {
            SyncHealth::Idle => "waiting for first flush".to_string(),
            SyncHealth::Ok => "up to date".green().to_string(),
            SyncHealth::Failed(detail) => format!("{} ({})", "failing".red(), detail),
        };

        format!(
            "{clear}--- livenote: live transcription to remote note ---\n\
             Connection:  {connection}\n\
             Device:      {device}\n\
             Signal:      {signal}\n\
             Note sync:   {sync}\n\
             \n--- In progress ---\n{in_flight}\n\
             \n--- Settled transcript (tail) ---\n{tail}\n\
             \n---------------------------------\n\
             Press Ctrl+C to stop...\n",
            clear = CLEAR_SCREEN,
            connection = self.connection,
            device = self.device,
            signal = if self.signal_present { "yes" } else { "no" },
            sync = sync_line,
            in_flight = self.in_flight,
            tail = self.settled_tail,
        )
    }
}

/// Periodically draw the latest snapshot until the sender side is dropped.
///
/// Purely read-only with respect to core state.
pub async fn run_display(mut rx: watch::Receiver<StatusSnapshot>, quiet: bool) {
    if quiet {
        // Still park on the channel so the task lifecycle matches
        while rx.changed().await.is_ok() {}
        return;
    }

    let mut ticker = tokio::time::interval(defaults::STATUS_REFRESH);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if rx.has_changed().is_err() {
            // Sender dropped: final redraw, then stop
            print!("{}", rx.borrow().render());
            let _ = io::stdout().flush();
            break;
        }
        print!("{}", rx.borrow_and_update().render());
        let _ = io::stdout().flush();
    }
}
