//! Actuation arbitration.
//!
//! Decides whether a target position becomes an actuator command:
//!
//! - **Busy**: a pulsed move is still outstanding (pulsed only).
//! - **Cooldown**: the minimum pause since the last move has not elapsed;
//!   the state moves to PAUSE.
//! - **No change**: the target is within the minimum step of the position.
//!
//! A forced request skips all three. If a pulsed move is outstanding it is
//! stopped and its completion cancelled first.
//!
//! Pulsed moves complete through [`ActuationArbiter::complete`] once the
//! scheduled deadline has passed. Absolute moves complete as soon as the
//! actuator accepts them.

use mixer_common::control_unit::config::MixerConfig;
use mixer_common::control_unit::state::{ActuationStyle, MoveDecision, Timestamp};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::control::position::PositionModel;
use crate::io::{Actuator, StatusSink};
use crate::state::controller::ControllerState;
use crate::state::operating::OperatingEvent;

/// Direction of a pulsed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Open,
    Close,
}

/// An outstanding pulsed move and its scheduled completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingMove {
    pub from: u8,
    pub target: u8,
    pub direction: Direction,
    pub issued_at: Timestamp,
    pub deadline: Timestamp,
}

impl PendingMove {
    /// Best estimate of the valve position at `now`, assuming linear travel.
    fn position_at(&self, now: Timestamp) -> f64 {
        let total = self.deadline.millis_since(self.issued_at);
        let fraction = if total == 0 {
            1.0
        } else {
            (now.millis_since(self.issued_at) as f64 / total as f64).min(1.0)
        };
        self.from as f64 + (self.target as f64 - self.from as f64) * fraction
    }
}

/// Arbiter between desired positions and the actuator.
#[derive(Debug, Clone, PartialEq)]
pub struct ActuationArbiter {
    style: ActuationStyle,
    min_move_pause_ms: u64,
    min_move_step: u8,
    full_travel_s: f64,
    min_travel_ms: u64,
    positions: PositionModel,
    pending: Option<PendingMove>,
}

impl ActuationArbiter {
    pub fn from_config(config: &MixerConfig) -> Self {
        Self {
            style: config.actuator.style,
            min_move_pause_ms: config.timing.min_move_pause_ms,
            min_move_step: config.actuator.min_move_step,
            full_travel_s: config.actuator.full_travel_s,
            min_travel_ms: config.actuator.min_travel_ms,
            positions: PositionModel::new(config.actuator.quantize_even),
            pending: None,
        }
    }

    #[inline]
    pub const fn style(&self) -> ActuationStyle {
        self.style
    }

    #[inline]
    pub const fn pending(&self) -> Option<&PendingMove> {
        self.pending.as_ref()
    }

    /// Deadline of the outstanding pulsed move, if any.
    #[inline]
    pub fn pending_deadline(&self) -> Option<Timestamp> {
        self.pending.map(|p| p.deadline)
    }

    /// Scheduled travel time for a pulsed move of `diff` percent [ms].
    pub fn travel_ms(&self, diff: u8) -> u64 {
        let ms = (diff as f64 / 100.0 * self.full_travel_s * 1000.0).round() as u64;
        ms.max(self.min_travel_ms)
    }

    /// Request a move to `target` (already normalized).
    pub fn request_move<A, K>(
        &mut self,
        state: &mut ControllerState,
        actuator: &mut A,
        status: &mut K,
        target: u8,
        force: bool,
        now: Timestamp,
    ) -> MoveDecision
    where
        A: Actuator + ?Sized,
        K: StatusSink + ?Sized,
    {
        if force {
            self.preempt(state, actuator, now);
        } else if let Some(decision) = self.check(state, status, target, now) {
            return decision;
        }

        match self.style {
            ActuationStyle::Pulsed => self.issue_pulsed(state, actuator, status, target, now),
            ActuationStyle::Absolute => self.issue_absolute(state, actuator, status, target, now),
        }
    }

    /// Busy, cooldown and minimum-step checks, in that order.
    fn check<K: StatusSink + ?Sized>(
        &self,
        state: &mut ControllerState,
        status: &mut K,
        target: u8,
        now: Timestamp,
    ) -> Option<MoveDecision> {
        if self.pending.is_some() {
            debug!(target, "actuator busy, move ignored");
            return Some(MoveDecision::RejectedBusy);
        }

        if let Some(last) = state.last_move {
            let elapsed = now.millis_since(last);
            if elapsed < self.min_move_pause_ms {
                let remaining_s = (self.min_move_pause_ms - elapsed).div_ceil(1000);
                debug!(target, remaining_s, "move pause active");
                state.apply(OperatingEvent::CooldownActive, status);
                return Some(MoveDecision::RejectedCooldown);
            }
        }

        if target.abs_diff(state.position) < self.min_move_step {
            debug!(position = state.position, target, "position within step, no move");
            return Some(MoveDecision::RejectedNoChange);
        }

        None
    }

    /// Stop and cancel an outstanding pulsed move.
    fn preempt<A: Actuator + ?Sized>(
        &mut self,
        state: &mut ControllerState,
        actuator: &mut A,
        now: Timestamp,
    ) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if let Err(err) = actuator.stop() {
            warn!(%err, "stop before forced move failed");
        }
        state.is_moving = false;
        state.position = self.positions.normalize(pending.position_at(now));
        info!(
            position = state.position,
            abandoned_target = pending.target,
            "outstanding move pre-empted"
        );
    }

    fn issue_pulsed<A, K>(
        &mut self,
        state: &mut ControllerState,
        actuator: &mut A,
        status: &mut K,
        target: u8,
        now: Timestamp,
    ) -> MoveDecision
    where
        A: Actuator + ?Sized,
        K: StatusSink + ?Sized,
    {
        let from = state.position;
        let direction = if target > from {
            Direction::Open
        } else {
            Direction::Close
        };
        let result = match direction {
            Direction::Open => actuator.open(),
            Direction::Close => actuator.close(),
        };
        if let Err(err) = result {
            warn!(%err, from, target, "actuator rejected pulsed move");
            state.apply(OperatingEvent::MoveRejected, status);
            return MoveDecision::ActuatorFailed;
        }

        let travel_ms = self.travel_ms(target.abs_diff(from));
        self.pending = Some(PendingMove {
            from,
            target,
            direction,
            issued_at: now,
            deadline: now.add_millis(travel_ms),
        });
        state.target_position = target;
        state.is_moving = true;
        info!(from, target, ?direction, travel_ms, "valve move started");
        state.apply(OperatingEvent::MoveIssued, status);
        MoveDecision::Issued
    }

    fn issue_absolute<A, K>(
        &mut self,
        state: &mut ControllerState,
        actuator: &mut A,
        status: &mut K,
        target: u8,
        now: Timestamp,
    ) -> MoveDecision
    where
        A: Actuator + ?Sized,
        K: StatusSink + ?Sized,
    {
        let from = state.position;
        if let Err(err) = actuator.go_to(target) {
            warn!(%err, from, target, "actuator rejected position command");
            state.apply(OperatingEvent::MoveRejected, status);
            return MoveDecision::ActuatorFailed;
        }

        state.target_position = target;
        state.apply(OperatingEvent::MoveIssued, status);
        state.position = target;
        state.last_move = Some(now);
        info!(from, target, "valve position commanded");
        state.apply(
            OperatingEvent::MoveCompleted {
                emergency_active: state.emergency.active,
            },
            status,
        );
        MoveDecision::Issued
    }

    /// Complete the outstanding pulsed move if its deadline has passed.
    ///
    /// Returns `true` if a move was completed.
    pub fn complete<A, K>(
        &mut self,
        state: &mut ControllerState,
        actuator: &mut A,
        status: &mut K,
        now: Timestamp,
    ) -> bool
    where
        A: Actuator + ?Sized,
        K: StatusSink + ?Sized,
    {
        let Some(pending) = self.pending else {
            return false;
        };
        if now < pending.deadline {
            return false;
        }
        self.pending = None;

        if let Err(err) = actuator.stop() {
            warn!(%err, "stop at end of travel failed");
        }
        state.is_moving = false;
        state.position = pending.target;
        state.last_move = Some(now);
        info!(position = state.position, "valve position reached");
        state.apply(
            OperatingEvent::MoveCompleted {
                emergency_active: state.emergency.active,
            },
            status,
        );
        true
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
