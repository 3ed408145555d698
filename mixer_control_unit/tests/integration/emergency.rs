//! Integration test: buffer interlock handling.

use mixer_common::control_unit::config::Variant;
use mixer_common::control_unit::state::{OperatingState, SafetyVerdict};
use mixer_control_unit::command::arbitration::Direction;
use mixer_control_unit::controller::PidCycle;
use mixer_control_unit::sim::ActuatorCommand;

use super::harness::*;

use OperatingState::*;
use SafetyVerdict::*;

#[test]
fn hysteresis_sequence_drives_states() {
    let mut c = started(Variant::AbsoluteWithBuffer);
    let mut verdicts = Vec::new();
    for (k, temp) in [41.0, 39.0, 37.0, 42.0, 46.0].into_iter().enumerate() {
        set_buffer(&mut c, Some(temp));
        verdicts.push(c.check_interlock(secs(30 * (k as u64 + 1))));
    }
    assert_eq!(
        verdicts,
        [
            Some(NoChange),
            Some(EnterEmergency),
            Some(StayEmergency),
            Some(StayEmergency),
            Some(ExitEmergency)
        ]
    );
    assert_eq!(c.actuator().commands(), [ActuatorCommand::GoTo(0)]);
    assert_eq!(c.state().position, 0);
    assert_eq!(c.state().operating_state(), Auto);
    assert_eq!(
        transitions(&c),
        [
            (Auto, Emergency),
            (Emergency, Moving),
            (Moving, Emergency),
            (Emergency, Auto)
        ]
    );
}

#[test]
fn trip_resets_pid_and_suspends_regulation() {
    let mut c = started(Variant::AbsoluteWithBuffer);
    c.pid_step(secs(150));
    c.pid_step(secs(300));
    assert!(c.state().pid.integral > 0.0);

    set_buffer(&mut c, Some(35.0));
    c.check_interlock(secs(330));
    assert!(!c.state().pid.initialized);
    assert_eq!(c.state().pid.integral, 0.0);
    assert_eq!(c.state().emergency.started_at, Some(secs(330)));
    // Cooldown from the move at 300 s does not hold back the forced close.
    assert_eq!(c.state().position, 0);

    assert_eq!(c.pid_step(secs(450)), PidCycle::Suspended);
    assert_eq!(
        c.actuator().commands(),
        [ActuatorCommand::GoTo(64), ActuatorCommand::GoTo(0)]
    );
}

#[test]
fn release_restarts_pid_from_scratch() {
    let mut c = started(Variant::AbsoluteWithBuffer);
    set_buffer(&mut c, Some(35.0));
    c.check_interlock(secs(30));
    set_buffer(&mut c, Some(45.0));
    assert_eq!(c.check_interlock(secs(600)), Some(ExitEmergency));
    assert!(!c.state().pid.initialized);
    assert_eq!(c.state().emergency.started_at, None);

    let cycle = c.pid_step(secs(750));
    assert!(matches!(cycle, PidCycle::Evaluated { decision: None, .. }));
    assert!(c.state().pid.initialized);
}

#[test]
fn trip_preempts_outstanding_pulse() {
    let mut c = started(Variant::PulsedWithBuffer);
    c.pid_step(secs(150));
    c.pid_step(secs(300));
    assert_eq!(c.next_completion_deadline(), Some(millis(316_800)));

    set_buffer(&mut c, Some(30.0));
    assert_eq!(c.check_interlock(secs(310)), Some(EnterEmergency));
    assert_eq!(
        c.actuator().commands(),
        [
            ActuatorCommand::Open,
            ActuatorCommand::Stop,
            ActuatorCommand::Close
        ]
    );
    // 10 s of a 16.8 s opening from 50 toward 64.
    assert_eq!(c.state().position, 58);
    let pending = *c.arbiter().pending().unwrap();
    assert_eq!(pending.direction, Direction::Close);
    assert_eq!(pending.target, 0);
    assert_eq!(c.next_completion_deadline(), Some(millis(379_600)));
    assert_eq!(c.state().operating_state(), Moving);

    // The cancelled opening never completes.
    assert!(!c.complete_move(secs(320)));
    assert_eq!(c.state().position, 58);

    assert!(c.complete_move(millis(379_600)));
    assert_eq!(c.state().position, 0);
    assert_eq!(c.state().operating_state(), Emergency);
}

#[test]
fn stay_does_not_repeat_outstanding_close() {
    let mut c = started(Variant::PulsedWithBuffer);
    set_buffer(&mut c, Some(30.0));
    c.check_interlock(secs(30));
    assert_eq!(c.actuator().commands(), [ActuatorCommand::Close]);
    assert_eq!(c.check_interlock(secs(60)), Some(StayEmergency));
    assert_eq!(c.actuator().commands(), [ActuatorCommand::Close]);
}

#[test]
fn release_during_close_waits_for_completion() {
    let mut c = started(Variant::PulsedWithBuffer);
    set_buffer(&mut c, Some(30.0));
    c.check_interlock(secs(30));
    let deadline = c.next_completion_deadline().unwrap();

    set_buffer(&mut c, Some(50.0));
    assert_eq!(c.check_interlock(secs(60)), Some(ExitEmergency));
    assert_eq!(c.state().operating_state(), Moving);

    c.complete_move(deadline);
    assert_eq!(c.state().position, 0);
    assert_eq!(c.state().operating_state(), Auto);
}

#[test]
fn stay_recloses_after_failed_close() {
    let mut c = started(Variant::AbsoluteWithBuffer);
    c.actuator_mut().reject_with("motor fault");
    set_buffer(&mut c, Some(30.0));
    c.check_interlock(secs(30));
    assert!(c.state().emergency.active);
    assert_eq!(c.state().operating_state(), Error);
    assert_eq!(c.state().position, 50);

    c.actuator_mut().accept();
    assert_eq!(c.check_interlock(secs(60)), Some(StayEmergency));
    assert_eq!(c.state().position, 0);
    assert_eq!(c.state().operating_state(), Emergency);
    assert_eq!(
        c.actuator().commands(),
        [ActuatorCommand::GoTo(0), ActuatorCommand::GoTo(0)]
    );
}

#[test]
fn invalid_buffer_reading_holds_emergency() {
    let mut c = started(Variant::AbsoluteWithBuffer);
    set_buffer(&mut c, Some(30.0));
    c.check_interlock(secs(30));

    set_buffer(&mut c, None);
    assert_eq!(c.check_interlock(secs(60)), None);
    assert!(c.state().emergency.active);
    assert_eq!(c.state().operating_state(), Emergency);
    assert_eq!(c.state().buffer_temp, None);
}
