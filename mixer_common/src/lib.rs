//! Mixer Common Library
//!
//! Shared constants, domain types and configuration loading for the
//! mixing-valve control unit and its tooling.
//!
//! # Module Structure
//!
//! - [`consts`] - System-wide limits and defaults
//! - [`config`] - Configuration loading traits and types
//! - [`control_unit`] - Control-unit domain types and configuration
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use mixer_common::prelude::*;
//!
//! let config = MixerConfig::preset(Variant::PulsedWithBuffer);
//! assert_eq!(config.actuator.style, ActuationStyle::Pulsed);
//! ```

pub mod config;
pub mod consts;
pub mod control_unit;
pub mod prelude;
