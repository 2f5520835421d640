//! Constants

/// Minimum allowed REFin frequency
pub const REF_IN_FREQ_MIN: u32 = 100_000;

/// Maximum allowed REFin frequency
pub const REF_IN_FREQ_MAX: u32 = 250_000_000;

/// Min Phase Detector Frequency
pub const PFD_FREQ_MIN: u32 = 125_000;

/// Max Phase Detector Frequency (fractional N mode)
pub const PFD_FREQ_FRACN_MAX: u32 = 32_000_000;

/// Fundamental VCO mode (before dividers), min frequency
pub const VCO_FREQ_MIN: u64 = 2_200_000_000;

/// Fundamental VCO mode (before dividers), max frequency
pub const VCO_FREQ_MAX: u64 = 4_400_000_000;

/// Minimum allowed output frequency.
/// Slightly above 2200 MHz fundamental output with divide-by-64 selected,
/// keeps the VCO inside its band with some margin.
pub const OUT_FREQ_MIN: u64 = 34_385_000;

/// VCO output, no divider
pub const OUT_FREQ_MAX: u64 = VCO_FREQ_MAX;

/// When the prescaler is set to
/// 4/5, the maximum RF frequency allowed is 3.6 GHz. Therefore,
/// when operating the ADF4351 above 3.6 GHz, the prescaler must
/// be set to 8/9.
pub const VCO_FREQ_P45_MAX: u64 = 3_600_000_000;

/// Largest RF output divider
pub const RF_DIVIDER_MAX: u64 = 64;

/// Prescaler = 4/5: N MIN = 23
pub const INT_MIN_P45: u32 = 23;

/// Prescaler = 8/9: N MIN = 75
pub const INT_MIN_P89: u32 = 75;

/// 16 INT bits
pub const INT_MAX: u32 = 65_535;

/// Fractional modulus limits (12 bits)
pub const MOD_MIN: u32 = 2;
pub const MOD_MAX: u32 = 4095;

/// 12-bit phase word
pub const PHASE_MAX: u16 = 4095;

/// Output power steps, -4 dBm to +5 dBm in 3 dB increments
pub const OUTPUT_POWER_MAX: u8 = 3;
