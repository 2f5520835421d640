//! ADF4351 registers
//!
//! Six 32-bit latches, R0..R5. The three low bits of every word select the
//! destination latch, the remaining bits hold the bitfields below.

use core::fmt;
use core::marker::PhantomData;

/// Register number marker types
macro_rules! gen_register_marker {
    ($r:ident, $n:tt) => {
        /// Register marker
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        pub struct $r {}

        impl Default for Reg<$r> {
            #[inline]
            fn default() -> Self {
                Reg { w: $n, phantom: PhantomData::default() }
            }
        }
    };
}

gen_register_marker!(R0, 0);
gen_register_marker!(R1, 1);
gen_register_marker!(R2, 2);
gen_register_marker!(R3, 3);
gen_register_marker!(R4, 4);
gen_register_marker!(R5, 5);

/// Mask covering the low `len` bits.
#[inline]
fn low_mask(len: u8) -> u32 {
    if len >= 32 {
        u32::MAX
    } else {
        (1u32 << len) - 1
    }
}

/// Single config register
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Reg<R> {
    /// Config register word
    w: u32,
    phantom: PhantomData<R>,
}

/// Bit operations on 32bit words
impl<R> Reg<R> {
    /// Whole register word.
    #[inline]
    pub fn word(self: &Self) -> u32 {
        self.w
    }

    /// Replaces the whole register word, control bits included.
    #[inline]
    pub fn set_word(mut self: Self, w: u32) -> Self {
        self.w = w;
        self
    }

    /// Extracts `len` bits starting at bit `start`.
    #[inline]
    pub fn field(self: &Self, start: u8, len: u8) -> u32 {
        debug_assert!(start as u32 + len as u32 <= 32);
        (self.w >> start) & low_mask(len)
    }

    /// Merges the low `len` bits of `value` into the word at bit `start`,
    /// leaving every other bit untouched.
    #[inline]
    pub fn set_field(mut self: Self, start: u8, len: u8, value: u32) -> Self {
        debug_assert!(start as u32 + len as u32 <= 32);
        let mask = low_mask(len) << start;
        self.w = (self.w & !mask) | ((value << start) & mask);
        self
    }

    #[inline]
    pub fn get<F>(self: &Self) -> F
    where
        F: Sized + BitField<R> + From<u32>,
    {
        F::from(self.field(F::offset(), F::num_bits()))
    }

    #[inline]
    pub fn set<F>(self: Self, f: F) -> Self
    where
        F: Sized + BitField<R> + Into<u32>,
    {
        self.set_field(F::offset(), F::num_bits(), f.into())
    }
}

/// Full set of config registers.
/// Defaults to all config bits set to 0 (control bits hold the register address).
///
/// When power is first applied to the ADF4351, the part requires
/// six writes (one each to R5, R4, R3, R2, R1, and R0) for the output
/// to become active.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RegisterSet {
    pub r0: Reg<R0>,
    pub r1: Reg<R1>,
    pub r2: Reg<R2>,
    pub r3: Reg<R3>,
    pub r4: Reg<R4>,
    pub r5: Reg<R5>,
}

/// Type-indexed register access
pub trait RIdx<R> {
    fn r(self: &Self) -> Reg<R>;
    fn update_r<F>(self: Self, f: F) -> Self
    where
        F: FnOnce(Reg<R>) -> Reg<R>;
}

macro_rules! gen_register_index {
    ($r:ident, $f:tt) => {
        impl RIdx<$r> for RegisterSet {
            #[inline]
            fn r(self: &Self) -> Reg<$r> {
                self.$f
            }
            #[inline]
            fn update_r<F>(mut self: Self, f: F) -> Self
            where
                F: FnOnce(Reg<$r>) -> Reg<$r>,
            {
                self.$f = f(self.$f);
                self
            }
        }
    };
}

gen_register_index!(R0, r0);
gen_register_index!(R1, r1);
gen_register_index!(R2, r2);
gen_register_index!(R3, r3);
gen_register_index!(R4, r4);
gen_register_index!(R5, r5);

impl RegisterSet {
    /// Register values in device format, indexed by register number.
    #[inline]
    pub fn to_words(self: &Self) -> [u32; 6] {
        [
            self.r0.word(),
            self.r1.word(),
            self.r2.word(),
            self.r3.word(),
            self.r4.word(),
            self.r5.word(),
        ]
    }

    /// Get register bitfield value
    #[inline]
    pub fn get<F, R>(self: &Self) -> F
    where
        F: Sized + BitField<R> + From<u32>,
        Self: RIdx<R>,
    {
        self.r().get()
    }

    /// Update register bitfield
    #[inline]
    pub fn set<F, R>(self: Self, f: F) -> Self
    where
        F: Sized + BitField<R> + Into<u32>,
        Self: RIdx<R>,
    {
        self.update_r(|r| r.set(f))
    }
}

impl fmt::Display for RegisterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, w) in self.to_words().iter().enumerate() {
            writeln!(f, "R{} = 0b{:032b}", i, w)?;
        }
        Ok(())
    }
}

/// Bit operations on 32bit words
pub trait BitField<R> {
    /// Number of bits in the bit field
    fn num_bits() -> u8;

    /// Offset from 0
    fn offset() -> u8;
}

/// Generate BitField implementation
macro_rules! gen_bitfield_impl {
    ($r:ty, $n:ident, $nb:tt, $off:tt) => {
        impl BitField<$r> for $n {
            #[inline]
            fn num_bits() -> u8 {
                $nb
            }
            #[inline]
            fn offset() -> u8 {
                $off
            }
        }
    };
}

/// Small bitfield-encoded numbers boilerplate
macro_rules! gen_bitfield_struct {
    ($(#[$meta:meta])*, $r:ty, $n:ident, $v:ty, $nb:tt, $off:tt) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        pub struct $n(pub $v);

        gen_bitfield_impl!($r, $n, $nb, $off);

        impl From<u32> for $n {
            #[inline]
            fn from(x: u32) -> Self {
                $n(x as $v)
            }
        }
        impl From<$n> for u32 {
            #[inline]
            fn from(x: $n) -> u32 {
                x.0 as u32
            }
        }
    };
}

/// Bitfield enums, `$d` is the variant for bit patterns with no name.
macro_rules! gen_bitfield_enum {
    ($(#[$meta:meta])*, $r:ty, $n:ident, $nb:tt, $off:tt, $d:ident,
     { $($(#[$vmeta:meta])* $v:ident = $x:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        pub enum $n {
            $($(#[$vmeta])* $v = $x),+
        }

        gen_bitfield_impl!($r, $n, $nb, $off);

        impl From<u32> for $n {
            #[inline]
            fn from(x: u32) -> Self {
                match x {
                    $(v if v == $x => $n::$v,)+
                    _ => $n::$d,
                }
            }
        }
        impl From<$n> for u32 {
            #[inline]
            fn from(x: $n) -> u32 {
                x as u32
            }
        }
    };
}

gen_bitfield_struct!(
    /// INT, Bits[DB30:DB15]. Integer part of the feedback division factor,
    /// 23 to 65,535 with the 4/5 prescaler, 75 to 65,535 with 8/9.
    , R0, Int, u16, 16, 15
);

gen_bitfield_struct!(
    /// FRAC, Bits[DB14:DB3]. Numerator of the Σ-Δ fraction, 0 to (MOD − 1).
    , R0, Frac, u16, 12, 3
);

gen_bitfield_enum!(
    /// PR1, Bit DB27. Dual-modulus prescaler. The 4/5 core tops out at
    /// 3.6 GHz, above that 8/9 is required.
    , R1, Prescaler, 1, 27, Pr45, {
        /// INT N MIN = 23
        Pr45 = 0,
        /// INT N MIN = 75
        Pr89 = 1,
    }
);

gen_bitfield_struct!(
    /// Phase word, Bits[DB26:DB15]. Output phase 0° to 360° in steps of 360°/MOD.
    , R1, Phase, u16, 12, 15
);

gen_bitfield_struct!(
    /// MOD, Bits[DB14:DB3]. Ratio of the PFD frequency to the channel step.
    , R1, Mod, u16, 12, 3
);

gen_bitfield_enum!(
    /// MUXOUT, Bits[DB28:DB26]
    , R2, Muxout, 3, 26, Reserved, {
        ThreeStateOut = 0,
        Dvdd = 1,
        Dgnd = 2,
        RCntOut = 3,
        NDivOut = 4,
        Alock = 5,
        Dlock = 6,
        Reserved = 7,
    }
);

gen_bitfield_enum!(
    /// Reference doubler, Bit DB25. Max REFin with the doubler on is 30 MHz.
    , R2, RefDoubler, 1, 25, Disabled, {
        Disabled = 0,
        Enabled = 1,
    }
);

gen_bitfield_enum!(
    /// Reference divide-by-2 between the R counter and the PFD, Bit DB24.
    , R2, Rdiv2, 1, 24, Disabled, {
        Disabled = 0,
        Enabled = 1,
    }
);

gen_bitfield_struct!(
    /// 10-bit R counter, Bits[DB23:DB14], 1 to 1023.
    , R2, RCounter, u16, 10, 14
);

gen_bitfield_struct!(
    /// Charge pump current, Bits[DB12:DB9]
    , R2, ChargePumpCurrent, u8, 4, 9
);

gen_bitfield_enum!(
    /// Lock detect function, Bit DB8. 40 PFD cycles for FRAC-N, 5 for INT-N.
    , R2, Ldf, 1, 8, FracN, {
        FracN = 0,
        IntN = 1,
    }
);

gen_bitfield_enum!(
    /// Lock detect precision, Bit DB7. 10 ns window for FRAC-N, 6 ns for INT-N.
    , R2, Ldp, 1, 7, Ldp10ns, {
        Ldp10ns = 0,
        Ldp6ns = 1,
    }
);

gen_bitfield_enum!(
    /// Phase detector polarity, Bit DB6. Positive for passive or
    /// noninverting active loop filters.
    , R2, PhaseDetectorPolarity, 1, 6, Negative, {
        Negative = 0,
        Positive = 1,
    }
);

gen_bitfield_enum!(
    /// Band select clock mode, Bit DB23. High selects the faster logic
    /// sequence, band select divider must then be <= 254.
    , R3, BandSelectClockMode, 1, 23, Low, {
        Low = 0,
        High = 1,
    }
);

gen_bitfield_enum!(
    /// PFD antibacklash pulse width, Bit DB22
    , R3, AntiBacklashPulseWidth, 1, 22, AB6ns, {
        /// FRAC-N
        AB6ns = 0,
        /// INT-N
        AB3ns = 1,
    }
);

gen_bitfield_enum!(
    /// Charge pump charge cancellation, Bit DB21. Reduces PFD spurs in INT-N mode.
    , R3, ChargeCancellation, 1, 21, Disabled, {
        Disabled = 0,
        Enabled = 1,
    }
);

gen_bitfield_enum!(
    /// Cycle slip reduction, Bit DB18. Needs a 50% duty cycle at the PFD.
    , R3, CycleSlipReduction, 1, 18, Disabled, {
        Disabled = 0,
        Enabled = 1,
    }
);

gen_bitfield_struct!(
    /// 12-bit clock divider, Bits[DB14:DB3]. Phase resync / fast lock timeout.
    , R3, ClockDividerValue, u16, 12, 3
);

gen_bitfield_enum!(
    /// Feedback select, Bit DB23. Fundamental takes the N counter feedback
    /// straight from the VCO.
    , R4, FeedbackSelect, 1, 23, Divided, {
        Divided = 0,
        Fundamental = 1,
    }
);

gen_bitfield_struct!(
    /// RF output divider select, Bits[DB22:DB20], divider = 2^value.
    , R4, RfDividerSelect, u8, 3, 20
);

gen_bitfield_struct!(
    /// Band select clock divider, Bits[DB19:DB12]
    , R4, BandSelectClockDiv, u8, 8, 12
);

gen_bitfield_enum!(
    /// VCO power down, Bit DB11
    , R4, VcoPowerDown, 1, 11, PoweredUp, {
        PoweredUp = 0,
        PoweredDown = 1,
    }
);

gen_bitfield_enum!(
    /// Auxiliary RF output enable, Bit DB8
    , R4, AuxOutputEnable, 1, 8, Disabled, {
        Disabled = 0,
        Enabled = 1,
    }
);

gen_bitfield_enum!(
    /// Primary RF output enable, Bit DB5
    , R4, RfOutputEnable, 1, 5, Disabled, {
        Disabled = 0,
        Enabled = 1,
    }
);

gen_bitfield_struct!(
    /// Output power, Bits[DB4:DB3], -4 dBm to +5 dBm in 3 dB steps.
    , R4, OutputPower, u8, 2, 3
);

gen_bitfield_struct!(
    /// Bits[DB20:DB19] are reserved and must be programmed to 0b11.
    , R5, Reserved5, u8, 2, 19
);

gen_bitfield_enum!(
    /// Lock detect pin operation, Bits[DB23:DB22]
    , R5, LockDetectPin, 2, 22, Low, {
        Low = 0,
        DigitalLockDetect = 1,
        Low1 = 2,
        High = 3,
    }
);
