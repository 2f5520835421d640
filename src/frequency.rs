//! Frequency calculations
//!
//! RF OUT = [INT + (FRAC/MOD)] × (f PFD / RF Divider)
//!
//! where:
//! RF OUT is the RF frequency output.
//! INT is the integer division factor.
//! FRAC is the numerator of the fractional division (0 to MOD − 1).
//! MOD is the preset fractional modulus (2 to 4095).
//! RF Divider is the output divider that divides down the VCO frequency.
//!
//! At GHz outputs with Hz steps the divider ratio needs more precision than
//! a double offers, so every quotient below is taken on exact integer
//! fractions in 128-bit arithmetic.

use crate::{config::*, constants::*, errors::*, register::*};

/// Greatest common divisor, Euclid.
pub fn gcd(mut u: u64, mut v: u64) -> u64 {
    while v != 0 {
        let t = u % v;
        u = v;
        v = t;
    }
    u
}

/// Reduces FRAC/MOD to lowest terms. A zero FRAC is left alone.
pub fn reduce(frac: u64, modulus: u64) -> (u64, u64) {
    if frac == 0 {
        return (frac, modulus);
    }
    match gcd(frac, modulus) {
        g if g > 1 => (frac / g, modulus / g),
        _ => (frac, modulus),
    }
}

/// One divider computation, not committed to the device.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrequencyPlan {
    /// Frequency asked for, Hz
    pub requested_hz: u64,
    /// Frequency the dividers actually produce, Hz (rounded down)
    pub achieved_hz: u64,
    /// Channel step MOD was derived from, Hz
    pub channel_step_hz: u32,
    pub int: u16,
    pub frac: u16,
    pub modulus: u16,
    /// RF divider = 2^rf_divider_select
    pub rf_divider_select: u8,
    pub prescaler: Prescaler,
    pub f_pfd: Fpfd,
}

impl FrequencyPlan {
    /// Output divider value
    #[inline]
    pub fn rf_divider(self: &Self) -> u64 {
        1 << self.rf_divider_select
    }

    /// Fundamental VCO frequency, Hz
    #[inline]
    pub fn vco_hz(self: &Self) -> u64 {
        self.requested_hz * self.rf_divider()
    }

    /// False when rounding moved the output off the requested frequency.
    #[inline]
    pub fn is_exact(self: &Self) -> bool {
        self.achieved_hz == self.requested_hz
    }

    /// INT-N mode (no fractional part)
    #[inline]
    pub fn is_int_n(self: &Self) -> bool {
        self.frac == 0
    }

    /// Packs the plan into the register set.
    ///
    /// Only fields owned by the frequency setting are touched, anything else
    /// (aux output, phase unless `phase` is given) keeps its current value.
    /// Cycle slip reduction is switched off; it is re-enabled once the
    /// loop settles.
    pub fn apply(
        self: &Self,
        cfg: &SynthesizerConfig,
        rs: RegisterSet,
        phase: Option<u16>,
    ) -> RegisterSet {
        let int_n = self.is_int_n();

        let rs = rs
            // R0
            .set(Frac(self.frac))
            .set(Int(self.int))
            // R1
            .set(Mod(self.modulus))
            .set(self.prescaler)
            // R2
            .set(PhaseDetectorPolarity::Positive)
            .set(if int_n { Ldp::Ldp6ns } else { Ldp::Ldp10ns })
            .set(if int_n { Ldf::IntN } else { Ldf::FracN })
            .set(ChargePumpCurrent(7))
            .set(RCounter(cfg.r_counter))
            .set(if cfg.ref_div2 { Rdiv2::Enabled } else { Rdiv2::Disabled })
            .set(if cfg.ref_doubler { RefDoubler::Enabled } else { RefDoubler::Disabled })
            .set(Muxout::Dlock)
            // R3
            .set(ClockDividerValue(cfg.clock_divider))
            .set(CycleSlipReduction::Disabled)
            .set(if int_n { ChargeCancellation::Enabled } else { ChargeCancellation::Disabled })
            .set(if int_n { AntiBacklashPulseWidth::AB3ns } else { AntiBacklashPulseWidth::AB6ns })
            .set(BandSelectClockMode::High)
            // R4
            .set(OutputPower(cfg.power_level))
            .set(RfOutputEnable::Enabled)
            .set(VcoPowerDown::PoweredUp)
            .set(BandSelectClockDiv(cfg.band_select_clock_div))
            .set(RfDividerSelect(self.rf_divider_select))
            .set(FeedbackSelect::Fundamental)
            // R5
            .set(Reserved5(0b11))
            .set(LockDetectPin::DigitalLockDetect);

        match phase {
            Some(p) => rs.set(Phase(p.min(PHASE_MAX))),
            None => rs,
        }
    }
}

/// Checks MOD, FRAC and INT against the device limits.
fn validate(int: u128, frac: u128, modulus: u128, prescaler: Prescaler) -> Result<(), Error> {
    let clamp = |x: u128| x.min(u32::MAX as u128) as u32;

    if !(MOD_MIN as u128..=MOD_MAX as u128).contains(&modulus) {
        return Err(Error::InvalidModulus(clamp(modulus)));
    }
    if frac > modulus - 1 {
        return Err(Error::InvalidFraction(clamp(frac)));
    }

    let int_min = match prescaler {
        Prescaler::Pr45 => INT_MIN_P45,
        Prescaler::Pr89 => INT_MIN_P89,
    };
    if !(int_min as u128..=INT_MAX as u128).contains(&int) {
        return Err(Error::InvalidInteger(clamp(int)));
    }

    Ok(())
}

/// Computes INT, FRAC, MOD, the RF divider and the prescaler for
/// `f_out_hz` with MOD derived from `channel_step_hz`.
///
/// Nothing is written anywhere, a failed plan leaves no trace.
pub fn plan(
    f_out_hz: u64,
    channel_step_hz: u32,
    cfg: &SynthesizerConfig,
) -> Result<FrequencyPlan, Error> {
    if !(OUT_FREQ_MIN..=OUT_FREQ_MAX).contains(&f_out_hz) {
        return Err(Error::InvalidOutputFrequency);
    }
    if channel_step_hz == 0 {
        return Err(Error::InvalidChannelStep);
    }

    let f_pfd = cfg.f_pfd();
    if !f_pfd.in_range() {
        return Err(Error::InvalidReferenceFrequency);
    }

    // Smallest power of two keeping the VCO in band
    let localosc_ratio = VCO_FREQ_MIN / f_out_hz;
    let mut rf_divider: u64 = 1;
    let mut rf_divider_select: u8 = 0;
    while rf_divider <= localosc_ratio && rf_divider <= RF_DIVIDER_MAX {
        rf_divider *= 2;
        rf_divider_select += 1;
    }

    let vcof = f_out_hz * rf_divider;
    let prescaler = if vcof > VCO_FREQ_P45_MAX { Prescaler::Pr89 } else { Prescaler::Pr45 };

    let num = f_pfd.numer() as u128;
    let den = f_pfd.denom() as u128;

    // N = VCO / f PFD = vcof × den / num
    let n_scaled = vcof as u128 * den;
    let int = n_scaled / num;
    let rem = n_scaled % num;

    // MOD = round(f PFD / step)
    let step_den = den * channel_step_hz as u128;
    let modulus = (2 * num + step_den) / (2 * step_den);

    // FRAC = floor((N − INT) × MOD + 1/2)
    let frac = (2 * rem * modulus + num) / (2 * num);

    // rounded up to a whole step: carry into INT
    let (int, frac) = if frac == modulus { (int + 1, 0) } else { (int, frac) };

    let (frac, modulus) = if modulus <= u64::MAX as u128 {
        let (f, m) = reduce(frac as u64, modulus as u64);
        (f as u128, m as u128)
    } else {
        (frac, modulus)
    };

    if let Err(e) = validate(int, frac, modulus, prescaler) {
        log::trace!("{} Hz / step {} Hz rejected: {}", f_out_hz, channel_step_hz, e);
        return Err(e);
    }

    // RF OUT = f PFD × (INT × MOD + FRAC) / (MOD × RF Divider)
    let achieved_hz =
        (num * (int * modulus + frac) / (den * modulus * rf_divider as u128)) as u64;

    let p = FrequencyPlan {
        requested_hz: f_out_hz,
        achieved_hz,
        channel_step_hz,
        int: int as u16,
        frac: frac as u16,
        modulus: modulus as u16,
        rf_divider_select,
        prescaler,
        f_pfd,
    };

    if !p.is_exact() {
        log::debug!("output freq {} Hz differs from requested {} Hz", achieved_hz, f_out_hz);
    }

    Ok(p)
}

/// Calculate actual output frequency from current register values, Hz
/// (rounded down). Zero if MOD is not programmed.
pub fn f_out_hz(cfg: &SynthesizerConfig, rs: &RegisterSet) -> u64 {
    let int: Int = rs.get();
    let frac: Frac = rs.get();
    let modulus: Mod = rs.get();
    let rfdiv: RfDividerSelect = rs.get();

    let modulus = modulus.0 as u128;
    if modulus == 0 {
        return 0;
    }

    let f_pfd = cfg.f_pfd();
    let rfdiv: u128 = 1 << rfdiv.0;

    (f_pfd.numer() as u128 * (int.0 as u128 * modulus + frac.0 as u128)
        / (f_pfd.denom() as u128 * modulus * rfdiv)) as u64
}
