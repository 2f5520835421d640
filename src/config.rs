//! Synthesizer configuration / reference path

use crate::{constants::*, errors::*};

/// Phase Frequency Detector' frequency, an exact fraction of Hz.
///
/// f PFD = REF IN × [(1 + D)/(R × (1 + T))]
/// where:
/// REF IN is the reference frequency input.
/// D is the RF REF IN doubler bit (0 or 1).
/// R is the RF reference division factor (1 to 1023).
/// T is the reference divide-by-2 bit (0 or 1).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Fpfd {
    num: u64,
    den: u64,
}

impl Fpfd {
    /// Reference path to PFD, no range checks.
    pub fn new(ref_in_hz: u32, r_counter: u16, doubler: bool, rdiv2: bool) -> Self {
        Fpfd {
            num: ref_in_hz as u64 * (1 + doubler as u64),
            den: (r_counter.max(1) as u64) * (1 + rdiv2 as u64),
        }
    }

    /// Numerator, Hz
    #[inline]
    pub fn numer(self: &Self) -> u64 {
        self.num
    }

    /// Denominator
    #[inline]
    pub fn denom(self: &Self) -> u64 {
        self.den
    }

    /// Whole Hz, rounded down
    #[inline]
    pub fn hz(self: &Self) -> u64 {
        self.num / self.den
    }

    /// True when PFD_FREQ_MIN <= f PFD <= PFD_FREQ_FRACN_MAX
    pub fn in_range(self: &Self) -> bool {
        self.num >= PFD_FREQ_MIN as u64 * self.den && self.num <= PFD_FREQ_FRACN_MAX as u64 * self.den
    }
}

/// Persistent chip settings, read by every divider computation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SynthesizerConfig {
    /// REFin, Hz
    pub ref_in_hz: u32,
    /// Reference doubler
    pub ref_doubler: bool,
    /// Reference divide-by-2
    pub ref_div2: bool,
    /// 10-bit R counter, 1 to 1023
    pub r_counter: u16,
    /// Band select clock divider
    pub band_select_clock_div: u8,
    /// 12-bit clock divider (phase resync / fast lock timeout)
    pub clock_divider: u16,
    /// RF output power, 0 to 3
    pub power_level: u8,
    /// Channel step used by the last frequency set, Hz
    pub channel_step_hz: u32,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        SynthesizerConfig {
            ref_in_hz: 25_000_000,
            ref_doubler: false,
            ref_div2: false,
            r_counter: 1,
            band_select_clock_div: 80,
            clock_divider: 150,
            power_level: 0,
            channel_step_hz: 1,
        }
    }
}

impl SynthesizerConfig {
    /// Current PFD frequency
    pub fn f_pfd(self: &Self) -> Fpfd {
        Fpfd::new(self.ref_in_hz, self.r_counter, self.ref_doubler, self.ref_div2)
    }

    /// Sets a new REFin frequency. The value is checked against the
    /// REFin limits and the resulting PFD frequency against the PFD
    /// limits, the config is left untouched on error.
    pub fn set_ref_in(self: &mut Self, ref_in_hz: u32) -> Result<(), Error> {
        if !(REF_IN_FREQ_MIN..=REF_IN_FREQ_MAX).contains(&ref_in_hz) {
            return Err(Error::InvalidReferenceFrequency);
        }

        let candidate = SynthesizerConfig { ref_in_hz, ..*self };
        if !candidate.f_pfd().in_range() {
            return Err(Error::InvalidReferenceFrequency);
        }

        *self = candidate;
        Ok(())
    }

    /// Replaces the reference path (doubler, R counter, divide-by-2),
    /// validated the same way as [`SynthesizerConfig::set_ref_in`].
    pub fn set_reference_path(
        self: &mut Self,
        r_counter: u16,
        doubler: bool,
        div2: bool,
    ) -> Result<(), Error> {
        if !(1..=1023).contains(&r_counter) {
            return Err(Error::InvalidReferenceFrequency);
        }

        let candidate = SynthesizerConfig {
            r_counter,
            ref_doubler: doubler,
            ref_div2: div2,
            ..*self
        };
        if !candidate.f_pfd().in_range() {
            return Err(Error::InvalidReferenceFrequency);
        }

        *self = candidate;
        Ok(())
    }
}
