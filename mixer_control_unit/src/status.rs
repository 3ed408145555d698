//! Status sink that logs transitions and keeps a bounded history.

use heapless::HistoryBuffer;
use mixer_common::control_unit::state::{OperatingState, Transition};
use tracing::info;

use crate::io::StatusSink;

/// Number of transitions retained for display.
pub const STATUS_HISTORY_LEN: usize = 16;

/// [`StatusSink`] backed by `tracing` and a fixed-size ring of recent
/// transitions.
#[derive(Debug, Default)]
pub struct TracingStatusSink {
    history: HistoryBuffer<Transition, STATUS_HISTORY_LEN>,
    announced: u64,
}

impl TracingStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total transitions announced since start.
    #[inline]
    pub const fn announced(&self) -> u64 {
        self.announced
    }

    /// The most recent transition.
    #[inline]
    pub fn last(&self) -> Option<&Transition> {
        self.history.recent()
    }

    /// State shown on the display, `AUTO` before any transition.
    pub fn current(&self) -> OperatingState {
        self.last().map_or(OperatingState::Auto, |t| t.to)
    }

    /// Retained transitions, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Transition> {
        self.history.oldest_ordered()
    }
}

impl StatusSink for TracingStatusSink {
    fn announce(&mut self, transition: Transition) {
        self.announced += 1;
        self.history.write(transition);
        info!(status = transition.to.label(), "status");
    }
}
