//! # Mixer Control Unit Library
//!
//! Closed-loop regulation of a heating flow circuit through a motorized
//! mixing valve. A PID engine turns the flow-temperature error into a
//! rate-limited valve position; a buffer-storage interlock can pre-empt it
//! and drive the valve closed.
//!
//! ## Control Flow
//!
//! 1. **Safety interlock**: evaluated first, may force the valve closed.
//! 2. **PID engine**: desired position from the flow error.
//! 3. **Position model**: clamp and optional even-integer quantization.
//! 4. **Actuation arbiter**: busy, cooldown and minimum-step checks.
//! 5. **Operating state machine**: AUTO / EMERGENCY / MOVING / PAUSE / ERROR.
//!
//! All of it operates on one [`ControllerState`](state::controller::ControllerState)
//! owned by [`MixerController`](controller::MixerController). Entry points are
//! synchronous and must be serialized by the caller; [`cycle::CycleRunner`]
//! is the reference scheduler.

pub mod command;
pub mod config;
pub mod control;
pub mod controller;
pub mod cycle;
pub mod error;
pub mod io;
pub mod safety;
pub mod sim;
pub mod state;
pub mod status;
