//! Sigma-delta amplitude
//!
//! The output stage only has four power steps. A 16-bit level is
//! approximated by switching between them once per control tick.

use fixed::types::I16F16;

use crate::constants::*;

const HALF: I16F16 = I16F16::from_bits(1 << 15);

/// First order sigma-delta modulator over the output power steps.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SigmaDelta {
    level: u16,
    integrated: I16F16,
}

impl SigmaDelta {
    pub fn new(level: u16) -> Self {
        SigmaDelta {
            level,
            integrated: I16F16::ZERO,
        }
    }

    /// Target level, 0 to 65535
    pub fn level(self: &Self) -> u16 {
        self.level
    }

    /// Changes the target, the integrator keeps running.
    pub fn set_level(self: &mut Self, level: u16) {
        self.level = level;
    }

    /// Next output power step, 0..=OUTPUT_POWER_MAX.
    pub fn step(self: &mut Self) -> u8 {
        // 16384 per power step
        let target = I16F16::from_bits(self.level as i32 * 4);

        let diff = target - self.integrated;
        let step = if diff < -HALF {
            -I16F16::ONE
        } else if diff > HALF {
            I16F16::ONE
        } else {
            I16F16::ZERO
        };

        let current = (self.integrated + step)
            .to_num::<i32>()
            .max(0)
            .min(OUTPUT_POWER_MAX as i32);

        // halved, rounding to nearest so the integrator can reach whole levels
        let sum = self.integrated + I16F16::from_num(current);
        self.integrated = I16F16::from_bits((sum.to_bits() + 1) >> 1);

        current as u8
    }
}
