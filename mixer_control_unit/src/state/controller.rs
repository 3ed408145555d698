//! The single mutable controller record.
//!
//! Created once at startup with the configured initial position in AUTO,
//! mutated only through [`MixerController`](crate::controller::MixerController)
//! entry points.

use mixer_common::control_unit::config::MixerConfig;
use mixer_common::control_unit::state::{OperatingState, Timestamp, Transition};
use tracing::{debug, info};

use crate::control::pid::{PidGains, PidState};
use crate::io::StatusSink;
use crate::safety::interlock::EmergencyState;
use crate::state::operating::{OperatingEvent, OperatingStateMachine, TransitionResult};

/// Everything the control core remembers between calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    /// Last known valve position [%].
    pub position: u8,
    /// Last commanded target [%].
    pub target_position: u8,
    /// True while a pulsed move is outstanding.
    pub is_moving: bool,
    /// Time of the last issued or completed move; `None` before the first.
    pub last_move: Option<Timestamp>,
    pub operating: OperatingStateMachine,
    pub emergency: EmergencyState,
    pub pid: PidState,
    /// Latest valid flow reading [°C].
    pub flow_temp: Option<f64>,
    /// Latest valid buffer reading [°C].
    pub buffer_temp: Option<f64>,
    pub setpoint: f64,
    pub gains: PidGains,
}

impl ControllerState {
    pub fn new(config: &MixerConfig, initial_position: u8) -> Self {
        Self {
            position: initial_position,
            target_position: initial_position,
            is_moving: false,
            last_move: None,
            operating: OperatingStateMachine::new(),
            emergency: EmergencyState::default(),
            pid: PidState::default(),
            flow_temp: None,
            buffer_temp: None,
            setpoint: config.pid.setpoint,
            gains: PidGains::from_config(&config.pid),
        }
    }

    #[inline]
    pub const fn operating_state(&self) -> OperatingState {
        self.operating.state()
    }

    /// Feed an event to the state machine. Real transitions are logged and
    /// announced; identity transitions have no side effects.
    pub fn apply<K: StatusSink + ?Sized>(
        &mut self,
        event: OperatingEvent,
        status: &mut K,
    ) -> Option<Transition> {
        match self.operating.handle_event(event) {
            TransitionResult::Changed(transition) => {
                info!(
                    from = %transition.from,
                    to = %transition.to,
                    position = self.position,
                    "operating state changed"
                );
                status.announce(transition);
                Some(transition)
            }
            TransitionResult::Unchanged(_) => None,
            TransitionResult::Rejected(reason) => {
                debug!(?event, reason, "operating event ignored");
                None
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
