//! Operating state machine: AUTO / EMERGENCY / MOVING / PAUSE / ERROR.
//!
//! Pure transition table. Side effects (status announcement, logging) are
//! applied by the caller only for [`TransitionResult::Changed`].

use mixer_common::control_unit::state::{OperatingState, Transition};

/// Events that drive the operating state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingEvent {
    /// Buffer interlock tripped, or a stay-closed re-close.
    InterlockTripped,
    /// Buffer interlock released.
    InterlockCleared,
    /// The actuator accepted a move command.
    MoveIssued,
    /// A move finished; `emergency_active` selects the resting state.
    MoveCompleted { emergency_active: bool },
    /// The actuator rejected a move command.
    MoveRejected,
    /// A move request fell inside the cooldown window.
    CooldownActive,
}

/// Result of an operating-state transition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionResult {
    /// State changed.
    Changed(Transition),
    /// Event accepted, state already correct.
    Unchanged(OperatingState),
    /// Event not applicable in the current state.
    Rejected(&'static str),
}

impl TransitionResult {
    #[inline]
    pub const fn transition(&self) -> Option<Transition> {
        match self {
            Self::Changed(t) => Some(*t),
            _ => None,
        }
    }
}

/// The regulator's operating state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperatingStateMachine {
    state: OperatingState,
    previous: OperatingState,
}

impl OperatingStateMachine {
    /// Start in AUTO.
    pub const fn new() -> Self {
        Self {
            state: OperatingState::Auto,
            previous: OperatingState::Auto,
        }
    }

    #[inline]
    pub const fn state(&self) -> OperatingState {
        self.state
    }

    /// State before the last real transition.
    #[inline]
    pub const fn previous(&self) -> OperatingState {
        self.previous
    }

    /// Whether regular (non-forced) control may act.
    #[inline]
    pub const fn allows_regulation(&self) -> bool {
        !matches!(self.state, OperatingState::Emergency)
    }

    /// Handle an operating event.
    pub fn handle_event(&mut self, event: OperatingEvent) -> TransitionResult {
        use OperatingEvent::*;
        use OperatingState::*;

        let next = match (self.state, event) {
            // any → Emergency
            (_, InterlockTripped) => Emergency,

            // A pre-empting close stays MOVING until it completes.
            (Moving, InterlockCleared) => Moving,
            (_, InterlockCleared) => Auto,

            (_, MoveIssued) => Moving,

            (_, MoveCompleted { emergency_active: true }) => Emergency,
            (_, MoveCompleted { emergency_active: false }) => Auto,

            (_, MoveRejected) => Error,

            (Emergency, CooldownActive) => {
                return TransitionResult::Rejected("cooldown does not apply in EMERGENCY");
            }
            (_, CooldownActive) => Pause,
        };

        if next == self.state {
            return TransitionResult::Unchanged(next);
        }
        let transition = Transition {
            from: self.state,
            to: next,
        };
        self.previous = self.state;
        self.state = next;
        TransitionResult::Changed(transition)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
