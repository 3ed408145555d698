//! Integration test: startup sequence.

use mixer_common::control_unit::config::{MixerConfig, Variant};
use mixer_common::control_unit::state::{OperatingState, Timestamp};
use mixer_control_unit::config::load_config_from_str;
use mixer_control_unit::sim::ActuatorCommand;

use super::harness::*;

#[test]
fn starts_in_auto_without_announcement() {
    let c = started(Variant::AbsoluteWithBuffer);
    let s = c.state();
    assert_eq!(s.operating_state(), OperatingState::Auto);
    assert_eq!(s.position, 50);
    assert_eq!(s.target_position, 50);
    assert_eq!(s.flow_temp, Some(20.0));
    assert_eq!(s.buffer_temp, Some(60.0));
    assert!(!s.pid.initialized);
    assert_eq!(c.status().announced(), 0);
    assert!(c.actuator().commands().is_empty());
}

#[test]
fn odd_initial_position_is_quantized() {
    let mut config = MixerConfig::default();
    config.position.initial = 51;
    let mut c = build(config);
    c.startup(Timestamp::ZERO);
    assert_eq!(c.state().position, 50);
    assert_eq!(c.state().target_position, 50);

    let mut config = MixerConfig::preset(Variant::PulsedLegacy);
    config.position.initial = 51;
    let c = build(config);
    assert_eq!(c.state().position, 51);
}

#[test]
fn cold_buffer_at_startup_closes_immediately() {
    let mut c = controller(Variant::AbsoluteWithBuffer);
    set_flow(&mut c, Some(20.0));
    set_buffer(&mut c, Some(30.0));
    c.startup(Timestamp::ZERO);

    assert!(c.state().emergency.active);
    assert_eq!(c.state().operating_state(), OperatingState::Emergency);
    assert_eq!(c.state().position, 0);
    assert_eq!(c.actuator().commands(), [ActuatorCommand::GoTo(0)]);
}

#[test]
fn disabled_interlock_ignores_cold_buffer() {
    let mut c = controller(Variant::PulsedNoBuffer);
    set_flow(&mut c, Some(20.0));
    set_buffer(&mut c, Some(10.0));
    c.startup(Timestamp::ZERO);

    assert_eq!(c.check_interlock(Timestamp::from_secs(30)), None);
    assert!(!c.state().emergency.active);
    assert_eq!(c.state().operating_state(), OperatingState::Auto);
    assert_eq!(c.state().buffer_temp, None);
}

#[test]
fn startup_reads_parameter_store() {
    let mut c = controller(Variant::AbsoluteWithBuffer);
    c.params_mut().setpoint = Some(31.5);
    c.params_mut().kp = Some(4.0);
    c.startup(Timestamp::ZERO);
    assert_eq!(c.state().setpoint, 31.5);
    assert_eq!(c.state().gains.kp, 4.0);
}

#[test]
fn out_of_range_setpoint_keeps_configured_value() {
    let mut c = controller(Variant::AbsoluteWithBuffer);
    c.params_mut().setpoint = Some(100.0);
    c.startup(Timestamp::ZERO);
    assert_eq!(c.state().setpoint, 25.0);

    c.params_mut().setpoint = None;
    c.startup(Timestamp::ZERO);
    assert_eq!(c.state().setpoint, 25.0);
}

#[test]
fn controller_from_toml() {
    let config = load_config_from_str(
        r#"
[actuator]
style = "pulsed"

[pid]
setpoint = 35.0

[position]
initial = 20
"#,
    )
    .unwrap();
    let mut c = build(config);
    c.startup(Timestamp::ZERO);
    assert_eq!(c.state().position, 20);
    assert_eq!(c.state().setpoint, 35.0);
}
