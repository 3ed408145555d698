//! Command processing root.
//!
//! Actuation arbitration: busy, cooldown and minimum-step checks, forced
//! overrides and the pending pulsed-move completion.

pub mod arbitration;
