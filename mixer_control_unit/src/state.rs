//! State module root.
//!
//! The operating state machine and the controller state record it lives in.

pub mod controller;
pub mod operating;
