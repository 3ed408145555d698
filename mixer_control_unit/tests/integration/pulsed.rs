//! Integration test: regulation with a pulsed (open/close/stop) actuator.

use mixer_common::control_unit::config::Variant;
use mixer_common::control_unit::state::{MoveDecision, OperatingState};
use mixer_control_unit::command::arbitration::Direction;
use mixer_control_unit::sim::ActuatorCommand;

use super::harness::*;

use OperatingState::*;

#[test]
fn opening_pulse_completes_at_deadline() {
    let mut c = started(Variant::PulsedWithBuffer);
    c.pid_step(secs(150));
    let cycle = c.pid_step(secs(300));
    assert_eq!(cycle.decision(), Some(MoveDecision::Issued));

    let pending = *c.arbiter().pending().unwrap();
    assert_eq!(pending.direction, Direction::Open);
    assert_eq!((pending.from, pending.target), (50, 64));
    // 14 % of 120 s.
    assert_eq!(c.next_completion_deadline(), Some(millis(316_800)));
    assert!(c.state().is_moving);
    assert_eq!(c.state().position, 50);
    assert_eq!(c.state().operating_state(), Moving);
    assert_eq!(c.actuator().commands(), [ActuatorCommand::Open]);

    assert!(!c.complete_move(millis(316_799)));
    assert!(c.complete_move(millis(316_800)));
    assert_eq!(
        c.actuator().commands(),
        [ActuatorCommand::Open, ActuatorCommand::Stop]
    );
    assert_eq!(c.state().position, 64);
    assert!(!c.state().is_moving);
    assert_eq!(c.state().last_move, Some(millis(316_800)));
    assert_eq!(c.state().operating_state(), Auto);
    assert_eq!(c.next_completion_deadline(), None);
}

#[test]
fn busy_while_pulse_outstanding() {
    let mut c = started(Variant::PulsedWithBuffer);
    c.pid_step(secs(150));
    c.pid_step(secs(300));
    let cycle = c.pid_step(secs(310));
    assert_eq!(cycle.decision(), Some(MoveDecision::RejectedBusy));
    assert_eq!(c.state().operating_state(), Moving);
    assert_eq!(c.actuator().commands(), [ActuatorCommand::Open]);
}

#[test]
fn closing_pulse_when_too_warm() {
    let mut c = started(Variant::PulsedWithBuffer);
    set_flow(&mut c, Some(30.0));
    c.pid_step(secs(150));
    c.pid_step(secs(300));
    let pending = *c.arbiter().pending().unwrap();
    assert_eq!(pending.direction, Direction::Close);
    assert_eq!(pending.target, 34);
    assert_eq!(c.actuator().commands(), [ActuatorCommand::Close]);
}

#[test]
fn cooldown_counts_from_completion() {
    let mut c = started(Variant::PulsedWithBuffer);
    c.pid_step(secs(150));
    c.pid_step(secs(300));
    c.complete_move(millis(316_800));

    // 30 s pause from 316.8 s.
    let cycle = c.pid_step(secs(340));
    assert_eq!(cycle.decision(), Some(MoveDecision::RejectedCooldown));
    assert_eq!(c.state().operating_state(), Pause);

    let cycle = c.pid_step(secs(350));
    assert_eq!(cycle.decision(), Some(MoveDecision::Issued));
    assert_eq!(c.state().operating_state(), Moving);
}

#[test]
fn legacy_positions_are_not_quantized() {
    let mut c = started(Variant::PulsedLegacy);
    c.pid_step(secs(150));
    c.pid_step(secs(300));
    assert_eq!(c.arbiter().pending().map(|p| p.target), Some(65));
    // 15 % of 120 s.
    assert_eq!(c.next_completion_deadline(), Some(secs(318)));
    c.complete_move(secs(318));
    assert_eq!(c.state().position, 65);
}

#[test]
fn rejected_pulse_leaves_nothing_pending() {
    let mut c = started(Variant::PulsedNoBuffer);
    c.pid_step(secs(150));
    c.actuator_mut().reject_with("relay stuck");
    let cycle = c.pid_step(secs(300));
    assert_eq!(cycle.decision(), Some(MoveDecision::ActuatorFailed));
    assert_eq!(c.state().operating_state(), Error);
    assert!(!c.state().is_moving);
    assert_eq!(c.next_completion_deadline(), None);
}
