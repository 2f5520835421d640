//! Channel step search
//!
//! A frequency can usually be reached with several channel steps, but only
//! some of them give a MOD, FRAC and INT the device accepts. The resolver
//! tries candidates coarsest exact fit first and falls back to a brute
//! force scan.

use crate::{config::*, errors::*, frequency::*};

/// Ordered (ascending) list of legal channel steps, Hz.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AllowedStepSet(&'static [u32]);

/// Steps offered by the signal generator firmware.
pub const DEFAULT_STEPS: AllowedStepSet = AllowedStepSet(&[
    1, 5, 8, 10, 20, 50, 100, 500, 1_000, 2_500, 5_000, 10_000, 25_000, 50_000, 100_000, 500_000,
]);

impl AllowedStepSet {
    /// `steps` must be sorted ascending.
    pub const fn new(steps: &'static [u32]) -> Self {
        AllowedStepSet(steps)
    }

    pub fn len(self: &Self) -> usize {
        self.0.len()
    }

    pub fn is_empty(self: &Self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(self: &Self, step_hz: u32) -> bool {
        self.0.binary_search(&step_hz).is_ok()
    }

    /// Smallest to largest
    pub fn ascending(self: &Self) -> impl Iterator<Item = u32> + 'static {
        let steps: &'static [u32] = self.0;
        steps.iter().copied()
    }

    /// Largest to smallest
    pub fn descending(self: &Self) -> impl Iterator<Item = u32> + 'static {
        let steps: &'static [u32] = self.0;
        steps.iter().rev().copied()
    }
}

impl Default for AllowedStepSet {
    fn default() -> Self {
        DEFAULT_STEPS
    }
}

/// Picks a channel step for a frequency.
#[derive(Debug, Copy, Clone)]
pub struct StepResolver {
    steps: AllowedStepSet,
    /// Try gcd(f, REFin) before anything else
    use_gcd: bool,
}

impl StepResolver {
    pub fn new(steps: AllowedStepSet, use_gcd: bool) -> Self {
        StepResolver { steps, use_gcd }
    }

    /// Candidate steps for `f_out_hz` in the order they are tried:
    /// 1. gcd(f, REFin), when enabled;
    /// 2. every allowed step that divides `f_out_hz`, largest first;
    /// 3. every allowed step, smallest first.
    pub fn candidates(self: &Self, f_out_hz: u64, ref_in_hz: u32) -> impl Iterator<Item = u32> {
        let gcd_step = if self.use_gcd {
            let g = gcd(f_out_hz, ref_in_hz as u64);
            if g > 0 && g <= u32::MAX as u64 { Some(g as u32) } else { None }
        } else {
            None
        };

        let exact = self
            .steps
            .descending()
            .filter(move |&s| f_out_hz % s as u64 == 0);

        gcd_step.into_iter().chain(exact).chain(self.steps.ascending())
    }

    /// First plan that passes validation, nothing is committed.
    pub fn resolve(self: &Self, f_out_hz: u64, cfg: &SynthesizerConfig) -> Result<FrequencyPlan, Error> {
        // out of range fails the same way for every step
        let mut last = Error::NoStepFound;

        for step in self.candidates(f_out_hz, cfg.ref_in_hz) {
            match plan(f_out_hz, step, cfg) {
                Ok(p) => {
                    log::debug!("{} Hz resolved with {} Hz step", f_out_hz, step);
                    return Ok(p);
                }
                Err(e) if e.kind() == ErrorKind::OutOfRange => return Err(e),
                Err(e) => last = e,
            }
        }

        log::debug!("{} Hz: no channel step found, last error: {}", f_out_hz, last);
        Err(Error::NoStepFound)
    }
}

impl Default for StepResolver {
    fn default() -> Self {
        StepResolver::new(DEFAULT_STEPS, false)
    }
}
