//! Valve position normalization.
//!
//! Every position that reaches the actuator or is stored as the current
//! position passes through [`PositionModel::normalize`]: round to the
//! nearest integer, optionally snap to an even integer, clamp to
//! `[MIN_POSITION, MAX_POSITION]`.

use mixer_common::consts::{MAX_POSITION, MIN_POSITION};

/// Position normalizer, configured once per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionModel {
    quantize_even: bool,
}

impl PositionModel {
    pub const fn new(quantize_even: bool) -> Self {
        Self { quantize_even }
    }

    #[inline]
    pub const fn quantize_even(&self) -> bool {
        self.quantize_even
    }

    /// Map an arbitrary real value to a valid valve position.
    ///
    /// With even quantization an odd rounded value moves toward the side the
    /// raw value lies on (22.6 → 22, 23.4 → 24). An exact odd integer snaps
    /// downward (23 → 22). Non-finite input maps to the nearest bound, NaN to
    /// closed.
    pub fn normalize(&self, raw: f64) -> u8 {
        if raw.is_nan() {
            return MIN_POSITION;
        }
        let mut rounded = raw.round();
        if self.quantize_even && (rounded % 2.0).abs() == 1.0 {
            rounded += if raw > rounded { 1.0 } else { -1.0 };
        }
        rounded.clamp(MIN_POSITION as f64, MAX_POSITION as f64) as u8
    }

    /// Whether `position` is a fixed point of [`normalize`](Self::normalize).
    #[inline]
    pub const fn is_valid(&self, position: u8) -> bool {
        position <= MAX_POSITION && (!self.quantize_even || position % 2 == 0)
    }
}

impl Default for PositionModel {
    fn default() -> Self {
        Self::new(true)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
