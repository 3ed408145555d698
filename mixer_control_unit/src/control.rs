//! Control engine root.
//!
//! Position model (clamp + quantization) and the PID engine.

pub mod pid;
pub mod position;
