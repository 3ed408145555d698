//! Safety module root.
//!
//! Buffer-storage interlock with hysteresis.

pub mod interlock;
