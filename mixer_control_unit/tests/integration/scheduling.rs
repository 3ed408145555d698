//! Integration test: event scheduling through `CycleRunner`.

use std::time::Duration;

use mixer_common::config::ConfigError;
use mixer_common::control_unit::config::{MixerConfig, Variant};
use mixer_common::control_unit::state::{OperatingState, Timestamp};
use mixer_control_unit::controller::MixerController;
use mixer_control_unit::cycle::{CycleEvent, CycleRunner};
use mixer_control_unit::sim::{
    ActuatorCommand, PlantConfig, PlantModel, SimActuator, SimParameterStore, SimSensors,
};
use mixer_control_unit::status::TracingStatusSink;

use super::harness::*;

#[test]
fn periodic_ticks_fire_at_their_intervals() {
    let mut runner =
        CycleRunner::start(started(Variant::AbsoluteWithBuffer), Timestamp::ZERO).unwrap();
    assert_eq!(
        runner.next_event(),
        (CycleEvent::TemperatureRead, secs(10))
    );

    runner.advance_to(secs(150));
    let stats = runner.stats();
    assert_eq!(stats.temperature_reads, 15);
    assert_eq!(stats.interlock_checks, 5);
    assert_eq!(stats.pid_steps, 1);
    assert!(runner.controller().state().pid.initialized);
    assert_eq!(runner.next_event(), (CycleEvent::TemperatureRead, secs(160)));
}

#[test]
fn interlock_runs_before_pid_at_same_instant() {
    let mut runner =
        CycleRunner::start(started(Variant::AbsoluteWithBuffer), Timestamp::ZERO).unwrap();
    runner.advance_to(secs(149));
    set_buffer(runner.controller_mut(), Some(30.0));
    runner.advance_to(secs(150));

    let c = runner.controller();
    assert_eq!(c.state().operating_state(), OperatingState::Emergency);
    assert!(!c.state().pid.initialized);
    assert_eq!(c.actuator().commands(), [ActuatorCommand::GoTo(0)]);
    assert_eq!(runner.stats().moves_issued, 0);
}

#[test]
fn pulsed_completion_is_dispatched() {
    let mut runner =
        CycleRunner::start(started(Variant::PulsedWithBuffer), Timestamp::ZERO).unwrap();
    runner.advance_to(secs(300));
    assert_eq!(runner.stats().moves_issued, 1);
    assert_eq!(
        runner.controller().next_completion_deadline(),
        Some(millis(316_800))
    );
    runner.advance_to(secs(316));
    assert_eq!(
        runner.next_event(),
        (CycleEvent::MoveCompletion, millis(316_800))
    );

    runner.advance_to(secs(320));
    assert_eq!(runner.stats().completions, 1);
    let c = runner.controller();
    assert_eq!(c.state().position, 64);
    assert_eq!(c.state().operating_state(), OperatingState::Auto);
}

#[test]
fn closed_loop_simulation_stays_sane() {
    let config = MixerConfig::preset(Variant::PulsedWithBuffer);
    let plant = PlantModel::new(
        PlantConfig {
            full_travel_s: config.actuator.full_travel_s,
            ..PlantConfig::default()
        },
        config.position.initial as f64,
    )
    .shared();
    let sensors = SimSensors::new(plant.clone(), &config.sensors);
    let params = SimParameterStore::from_config(&config.pid);
    let actuator = SimActuator::new(config.actuator.style).with_plant(plant.clone());
    let controller =
        MixerController::new(config, sensors, params, actuator, TracingStatusSink::new());
    let mut runner = CycleRunner::start(controller, Timestamp::ZERO).unwrap();

    let mut now = Timestamp::ZERO;
    for _ in 0..(6 * 3600) {
        plant.borrow_mut().step(Duration::from_secs(1));
        now = now.add_millis(1000);
        runner.advance_to(now);
    }

    let c = runner.controller();
    let s = c.state();
    assert!(runner.stats().moves_issued > 0);
    assert_ne!(s.operating_state(), OperatingState::Error);
    assert_eq!(s.position % 2, 0);
    assert!(s.position <= 100);
    let flow = plant.borrow().flow_temp();
    assert!((20.0..=60.0).contains(&flow));
    // Flow starts at 40 °C with the valve half open; regulation pulls it down.
    assert!(flow < 35.0, "flow {flow}");
}

#[test]
fn zero_interval_is_rejected_before_startup() {
    let mut config = MixerConfig::default();
    config.timing.temp_read_interval_ms = 0;
    let c = build(config);
    let err = CycleRunner::start(c, Timestamp::ZERO).err().unwrap();
    assert!(matches!(err, ConfigError::ValidationError(_)));
    assert!(err.to_string().contains("timing.temp_read_interval_ms"));
}
