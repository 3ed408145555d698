//! Mixing-circuit plant model.
//!
//! - **Valve**: travels at `100 / full_travel_s` percent per second while
//!   opening, closing or heading to an absolute target.
//! - **Flow**: first-order lag toward the mixing temperature
//!   `return + (buffer - return) * position / 100`.
//! - **Buffer**: charges at a constant rate and discharges in proportion to
//!   the valve opening.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use mixer_common::consts::{FULL_TRAVEL_S_DEFAULT, MAX_POSITION, MIN_POSITION};
use tracing::trace;

/// Plant shared between the simulated sensors and actuator.
pub type SharedPlant = Rc<RefCell<PlantModel>>;

/// Physical parameters of the simulated circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantConfig {
    /// Heating return temperature, the cold side of the mixer [°C].
    pub return_temp: f64,
    /// Buffer temperature at start [°C].
    pub buffer_initial: f64,
    /// Buffer gain from the heat source [°C/h].
    pub buffer_charge_per_hour: f64,
    /// Buffer loss at a fully open valve [°C/h].
    pub buffer_draw_per_hour: f64,
    /// Flow temperature time constant [s].
    pub flow_time_constant_s: f64,
    /// Full valve travel [s].
    pub full_travel_s: f64,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            return_temp: 20.0,
            buffer_initial: 60.0,
            buffer_charge_per_hour: 2.0,
            buffer_draw_per_hour: 8.0,
            flow_time_constant_s: 240.0,
            full_travel_s: FULL_TRAVEL_S_DEFAULT,
        }
    }
}

/// What the valve motor is currently doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValveMotion {
    Idle,
    Opening,
    Closing,
    Toward(f64),
}

/// Simulated valve, flow and buffer.
#[derive(Debug, Clone)]
pub struct PlantModel {
    config: PlantConfig,
    valve_position: f64,
    motion: ValveMotion,
    flow_temp: f64,
    buffer_temp: f64,
    elapsed: Duration,
}

impl PlantModel {
    /// Start at steady state for the given valve position.
    pub fn new(config: PlantConfig, valve_position: f64) -> Self {
        let valve_position = valve_position.clamp(MIN_POSITION as f64, MAX_POSITION as f64);
        let buffer_temp = config.buffer_initial;
        let mut plant = Self {
            config,
            valve_position,
            motion: ValveMotion::Idle,
            flow_temp: 0.0,
            buffer_temp,
            elapsed: Duration::ZERO,
        };
        plant.flow_temp = plant.mixing_temp();
        plant
    }

    pub fn shared(self) -> SharedPlant {
        Rc::new(RefCell::new(self))
    }

    /// Temperature the flow settles at for the current valve position.
    pub fn mixing_temp(&self) -> f64 {
        let ret = self.config.return_temp;
        ret + (self.buffer_temp - ret).max(0.0) * self.valve_position / 100.0
    }

    /// Advance the simulation by `dt`.
    pub fn step(&mut self, dt: Duration) {
        let dt_s = dt.as_secs_f64();
        if dt_s <= 0.0 {
            return;
        }
        self.elapsed += dt;

        // ── Valve ──
        let travel = 100.0 / self.config.full_travel_s * dt_s;
        let (min, max) = (MIN_POSITION as f64, MAX_POSITION as f64);
        self.valve_position = match self.motion {
            ValveMotion::Idle => self.valve_position,
            ValveMotion::Opening => (self.valve_position + travel).min(max),
            ValveMotion::Closing => (self.valve_position - travel).max(min),
            ValveMotion::Toward(target) => {
                let diff = target - self.valve_position;
                if diff.abs() <= travel {
                    self.motion = ValveMotion::Idle;
                    target
                } else {
                    self.valve_position + travel.copysign(diff)
                }
            }
        };

        // ── Buffer ──
        let hours = dt_s / 3600.0;
        self.buffer_temp += (self.config.buffer_charge_per_hour
            - self.config.buffer_draw_per_hour * self.valve_position / 100.0)
            * hours;

        // ── Flow (first-order lag) ──
        let alpha = dt_s / (self.config.flow_time_constant_s + dt_s);
        self.flow_temp += alpha * (self.mixing_temp() - self.flow_temp);

        trace!(
            valve = self.valve_position,
            flow = self.flow_temp,
            buffer = self.buffer_temp,
            "plant step"
        );
    }

    pub fn set_motion(&mut self, motion: ValveMotion) {
        self.motion = motion;
    }

    #[inline]
    pub fn motion(&self) -> ValveMotion {
        self.motion
    }

    #[inline]
    pub fn valve_position(&self) -> f64 {
        self.valve_position
    }

    #[inline]
    pub fn flow_temp(&self) -> f64 {
        self.flow_temp
    }

    #[inline]
    pub fn buffer_temp(&self) -> f64 {
        self.buffer_temp
    }

    /// Override the buffer temperature (scenario injection).
    pub fn set_buffer_temp(&mut self, temp: f64) {
        self.buffer_temp = temp;
    }

    /// Override the flow temperature (scenario injection).
    pub fn set_flow_temp(&mut self, temp: f64) {
        self.flow_temp = temp;
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[inline]
    pub fn config(&self) -> &PlantConfig {
        &self.config
    }
}
