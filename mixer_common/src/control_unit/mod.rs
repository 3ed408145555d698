//! Control-unit domain types shared between the core and its tooling.
//!
//! - [`state`] - operating states, verdicts, decisions, timestamps
//! - [`config`] - `MixerConfig` and its validated sections

pub mod config;
pub mod state;
