//! Shared setup for the integration tests.

use mixer_common::control_unit::config::{MixerConfig, Variant};
use mixer_common::control_unit::state::{OperatingState, Timestamp};
use mixer_control_unit::controller::MixerController;
use mixer_control_unit::sim::{PlantConfig, PlantModel, SimActuator, SimParameterStore, SimSensors};
use mixer_control_unit::status::TracingStatusSink;

pub type TestController =
    MixerController<SimSensors, SimParameterStore, SimActuator, TracingStatusSink>;

/// Controller over a plant at rest; sensor values are set explicitly by
/// each test through overrides.
pub fn build(config: MixerConfig) -> TestController {
    let plant = PlantModel::new(PlantConfig::default(), config.position.initial as f64).shared();
    let sensors = SimSensors::new(plant, &config.sensors);
    let params = SimParameterStore::from_config(&config.pid);
    let actuator = SimActuator::new(config.actuator.style);
    MixerController::new(config, sensors, params, actuator, TracingStatusSink::new())
}

pub fn controller(variant: Variant) -> TestController {
    build(MixerConfig::preset(variant))
}

/// Controller with flow 20 °C, buffer 60 °C, started at t = 0.
pub fn started(variant: Variant) -> TestController {
    let mut c = controller(variant);
    set_flow(&mut c, Some(20.0));
    set_buffer(&mut c, Some(60.0));
    c.startup(Timestamp::ZERO);
    c
}

pub fn set_flow(c: &mut TestController, value: Option<f64>) {
    let id = c.config().sensors.flow;
    c.sensors_mut().set_override(id, value);
}

pub fn set_buffer(c: &mut TestController, value: Option<f64>) {
    let id = c.config().sensors.buffer;
    c.sensors_mut().set_override(id, value);
}

pub fn secs(s: u64) -> Timestamp {
    Timestamp::from_secs(s)
}

pub fn millis(ms: u64) -> Timestamp {
    Timestamp::from_millis(ms)
}

/// Announced transitions as `(from, to)` pairs, oldest first.
pub fn transitions(c: &TestController) -> Vec<(OperatingState, OperatingState)> {
    c.status().history().map(|t| (t.from, t.to)).collect()
}
