//! Integration test: regulation with an absolute-position actuator.

use mixer_common::control_unit::config::Variant;
use mixer_common::control_unit::state::{Gain, MoveDecision, OperatingState};
use mixer_control_unit::control::pid::PidStep;
use mixer_control_unit::controller::PidCycle;
use mixer_control_unit::sim::ActuatorCommand;

use super::harness::*;

use OperatingState::*;

#[test]
fn first_step_only_initializes() {
    let mut c = started(Variant::AbsoluteWithBuffer);
    let cycle = c.pid_step(secs(150));
    assert!(matches!(
        cycle,
        PidCycle::Evaluated {
            step: PidStep::Initialized,
            target: None,
            decision: None
        }
    ));
    assert!(c.state().pid.initialized);
    assert_eq!(c.state().pid.last_error, 5.0);
    assert!(c.actuator().commands().is_empty());
}

#[test]
fn reference_step_moves_valve() {
    let mut c = started(Variant::AbsoluteWithBuffer);
    c.pid_step(secs(150));
    let cycle = c.pid_step(secs(300));

    let PidCycle::Evaluated {
        step: PidStep::Output { output, terms, .. },
        target,
        decision,
    } = cycle
    else {
        panic!("expected output, got {cycle:?}");
    };
    assert!((terms.raw - 31.5).abs() < 1e-9);
    assert_eq!(output, 15.0);
    assert_eq!(c.state().pid.integral, 50.0);
    assert_eq!(target, Some(64));
    assert_eq!(decision, Some(MoveDecision::Issued));

    assert_eq!(c.actuator().commands(), [ActuatorCommand::GoTo(64)]);
    assert_eq!(c.state().position, 64);
    assert_eq!(c.state().target_position, 64);
    assert!(!c.state().is_moving);
    assert_eq!(c.state().last_move, Some(secs(300)));
    assert_eq!(c.state().operating_state(), Auto);
    assert_eq!(transitions(&c), [(Auto, Moving), (Moving, Auto)]);
}

#[test]
fn cooldown_pauses_then_resumes() {
    let mut c = started(Variant::AbsoluteWithBuffer);
    c.pid_step(secs(150));
    c.pid_step(secs(300));

    let cycle = c.pid_step(secs(330));
    assert_eq!(cycle.decision(), Some(MoveDecision::RejectedCooldown));
    assert_eq!(c.state().operating_state(), Pause);
    assert_eq!(c.state().position, 64);
    assert_eq!(c.state().last_move, Some(secs(300)));

    let cycle = c.pid_step(secs(450));
    assert_eq!(cycle.decision(), Some(MoveDecision::Issued));
    assert_eq!(c.state().position, 78);
    assert_eq!(c.state().operating_state(), Auto);
    assert_eq!(
        transitions(&c),
        [
            (Auto, Moving),
            (Moving, Auto),
            (Auto, Pause),
            (Pause, Moving),
            (Moving, Auto)
        ]
    );
}

#[test]
fn dead_band_issues_nothing() {
    let mut c = started(Variant::AbsoluteWithBuffer);
    set_flow(&mut c, Some(24.8));
    c.pid_step(secs(150));
    let cycle = c.pid_step(secs(300));
    assert!(matches!(
        cycle,
        PidCycle::Evaluated {
            step: PidStep::OnTarget { .. },
            ..
        }
    ));
    assert_eq!(c.state().pid.integral, 0.0);
    assert!(c.actuator().commands().is_empty());
}

#[test]
fn rejected_command_enters_error_and_recovers() {
    let mut c = started(Variant::AbsoluteWithBuffer);
    c.pid_step(secs(150));
    c.actuator_mut().reject_with("motor fault");

    let cycle = c.pid_step(secs(300));
    assert_eq!(cycle.decision(), Some(MoveDecision::ActuatorFailed));
    assert_eq!(c.state().operating_state(), Error);
    assert_eq!(c.state().position, 50);
    assert_eq!(c.state().last_move, None);

    c.actuator_mut().accept();
    let cycle = c.pid_step(secs(450));
    assert_eq!(cycle.decision(), Some(MoveDecision::Issued));
    assert_eq!(c.state().operating_state(), Auto);
    assert_eq!(c.state().position, 64);
}

#[test]
fn missing_flow_reading_skips_step() {
    let mut c = started(Variant::AbsoluteWithBuffer);
    c.pid_step(secs(150));
    set_flow(&mut c, None);
    assert_eq!(c.pid_step(secs(300)), PidCycle::NoMeasurement);
    assert_eq!(c.state().flow_temp, None);
    assert!(c.actuator().commands().is_empty());

    set_flow(&mut c, Some(f64::NAN));
    assert_eq!(c.pid_step(secs(450)), PidCycle::NoMeasurement);
}

#[test]
fn zero_gains_from_store_hold_position() {
    let mut c = started(Variant::AbsoluteWithBuffer);
    c.pid_step(secs(150));
    for gain in Gain::ALL {
        c.params_mut().set_gain(gain, Some(0.0));
    }
    let cycle = c.pid_step(secs(300));
    assert_eq!(cycle.decision(), Some(MoveDecision::RejectedNoChange));
    assert_eq!(c.state().operating_state(), Auto);
    assert_eq!(c.status().announced(), 0);
}

#[test]
fn invalid_gains_keep_previous_values() {
    let mut c = started(Variant::AbsoluteWithBuffer);
    c.pid_step(secs(150));
    c.params_mut().set_gain(Gain::Kp, Some(-1.0));
    c.params_mut().set_gain(Gain::Ki, Some(f64::NAN));
    c.params_mut().set_gain(Gain::Kd, None);
    c.params_mut().setpoint = Some(0.0);
    c.pid_step(secs(300));
    let gains = c.state().gains;
    assert_eq!((gains.kp, gains.ki, gains.kd), (6.0, 0.03, 2.0));
    assert_eq!(c.state().setpoint, 25.0);
}

#[test]
fn snapshot_reflects_state() {
    let mut c = started(Variant::AbsoluteWithBuffer);
    c.pid_step(secs(150));
    c.pid_step(secs(300));
    let snap = c.snapshot(secs(301));
    assert_eq!(snap.state, Auto);
    assert_eq!(snap.position, 64);
    assert_eq!(snap.flow_temp, Some(20.0));
    assert_eq!(snap.integral, 50.0);
    assert!(!snap.emergency_active);

    let json = serde_json::to_value(&snap).unwrap();
    assert_eq!(json["state"], "AUTO");
    assert_eq!(json["position"], 64);
}
