//! Glide / modulation loop
//!
//! Runs once per control tick. A waveform law picks the setpoint around
//! the base frequency, a glide law moves the current frequency toward it,
//! and the synthesizer is retuned whenever the rounded output frequency
//! changes. Once the glide has arrived, lock assist is turned on once.
//!
//! Frequencies are kept in 48.16 fixed point so slow glides accumulate
//! sub-Hz steps instead of stalling.

use core::time::Duration;

use fixed::types::I48F16;
use rand::Rng;
use rand_core::RngCore;

use crate::{device::*, errors::*, synth::*};

/// Frequency, Hz
type Hz = I48F16;

/// Phase accumulator step limits
pub const MOD_SPEED_MIN: u16 = 1;
pub const MOD_SPEED_MAX: u16 = 1024;
pub const MOD_SPEED_DEFAULT: u16 = 2;

/// How the current frequency follows the setpoint.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GlideLaw {
    /// Jump straight to the setpoint
    None,
    /// Equal steps, arriving after this many ticks
    Linear(u32),
    /// 1/k of the remaining distance per tick
    Exponential(u32),
    /// Fixed rate that covers the distance in this many seconds,
    /// at least 1 Hz per tick
    ConstantRate(u32),
}

impl GlideLaw {
    fn normalized(self: Self) -> Self {
        match self {
            GlideLaw::Linear(0) | GlideLaw::Exponential(0) | GlideLaw::ConstantRate(0) => GlideLaw::None,
            law => law,
        }
    }
}

/// Setpoint modulation around the base frequency. Amplitudes in Hz.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Waveform {
    None,
    /// Sawtooth from base to base + amplitude
    LinearRamp(i32),
    /// base + table[phase] / 65536 × amplitude
    Sine(i32),
    /// Rise from base to base + amplitude and back
    Triangle(i32),
    /// New random offset in [0, amplitude) every tick
    Random(i32),
}

impl Waveform {
    fn normalized(self: Self) -> Self {
        match self {
            Waveform::LinearRamp(0) | Waveform::Sine(0) | Waveform::Triangle(0) | Waveform::Random(0) => {
                Waveform::None
            }
            w => w,
        }
    }
}

/// What one tick did to the device.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No glide or waveform law active
    Idle,
    /// New frequency committed, Hz
    Retuned(u64),
    /// Frequency unchanged, cycle slip reduction switched on
    LockAssist,
    /// Frequency unchanged, still gliding toward the setpoint
    Settling,
    /// Frequency unchanged, lock assist already on
    Holding,
}

/// Full scale of the waveform table samples
const TABLE_SCALE: i64 = 65536;

fn to_hz(f: Hz) -> u64 {
    f.round().to_num::<i64>().max(0) as u64
}

pub struct GlideController<'a> {
    table: &'a [i16],
    /// Frequency last set by the user, waveforms modulate around it
    base: Hz,
    /// Where the running linear glide started
    start: Hz,
    setpoint: Hz,
    current: Hz,
    /// Last frequency written to the synthesizer by this controller
    committed: Option<u64>,
    glide: GlideLaw,
    waveform: Waveform,
    phase: usize,
    mod_speed: u16,
    /// Constant-rate magnitude, Hz/s, and the setpoint it was computed for
    rate: Hz,
    rate_setpoint: Hz,
    dither_hz: u32,
    locked: bool,
}

impl<'a> GlideController<'a> {
    /// `table` is the sine table used by [`Waveform::Sine`], `f_hz` the
    /// starting frequency. Nothing counts as committed until the first
    /// retune, so the first active tick always writes a full plan.
    pub fn new(table: &'a [i16], f_hz: u64) -> Self {
        let f = Hz::saturating_from_num(f_hz);
        GlideController {
            table,
            base: f,
            start: f,
            setpoint: f,
            current: f,
            committed: None,
            glide: GlideLaw::None,
            waveform: Waveform::None,
            phase: 0,
            mod_speed: MOD_SPEED_DEFAULT,
            rate: Hz::ZERO,
            rate_setpoint: f,
            dither_hz: 0,
            locked: false,
        }
    }

    pub fn glide(self: &Self) -> GlideLaw {
        self.glide
    }

    pub fn waveform(self: &Self) -> Waveform {
        self.waveform
    }

    pub fn mod_speed(self: &Self) -> u16 {
        self.mod_speed
    }

    pub fn dither_hz(self: &Self) -> u32 {
        self.dither_hz
    }

    /// Phase accumulator, always below the table length
    pub fn phase(self: &Self) -> usize {
        self.phase
    }

    /// Current frequency without dither, Hz
    pub fn current_hz(self: &Self) -> u64 {
        to_hz(self.current)
    }

    pub fn setpoint_hz(self: &Self) -> u64 {
        to_hz(self.setpoint)
    }

    pub fn committed_hz(self: &Self) -> Option<u64> {
        self.committed
    }

    pub fn is_locked(self: &Self) -> bool {
        self.locked
    }

    /// New base frequency. Stops any waveform. Without a glide law the
    /// synthesizer is retuned right away, otherwise the glide toward it
    /// starts on the next tick. Both paths pick the channel step the same
    /// way.
    pub fn set_frequency<T>(self: &mut Self, synth: &mut Synthesizer<T>, f_hz: u64) -> Result<(), Error>
    where
        T: RegisterTransport,
    {
        let f = Hz::saturating_from_num(f_hz);

        if self.glide == GlideLaw::None {
            synth.optimise_frequency(f_hz, false)?;
            self.current = f;
            self.committed = Some(f_hz);
            self.locked = false;
        } else {
            self.start = self.current;
            log::info!("frequency setpoint set to {} Hz", f_hz);
        }

        self.base = f;
        self.setpoint = f;
        self.waveform = Waveform::None;
        Ok(())
    }

    /// Selects the glide law, replacing the previous one. A zero
    /// parameter turns gliding off.
    pub fn set_glide(self: &mut Self, law: GlideLaw) {
        let law = law.normalized();
        self.glide = law;
        self.start = self.current;
        if let GlideLaw::ConstantRate(secs) = law {
            self.rate = (self.setpoint - self.current).abs() / secs as i64;
            self.rate_setpoint = self.setpoint;
        }
        log::info!("glide set to {:?}", law);
    }

    /// Selects the waveform law, replacing the previous one. A zero
    /// amplitude turns modulation off.
    pub fn set_waveform(self: &mut Self, waveform: Waveform) {
        self.waveform = waveform.normalized();
        log::info!("waveform set to {:?}", self.waveform);
    }

    /// Phase accumulator step per tick, clamped to 1..=1024. Returns the
    /// value applied.
    pub fn set_mod_speed(self: &mut Self, speed: u16) -> u16 {
        let s = speed.max(MOD_SPEED_MIN).min(MOD_SPEED_MAX);
        if s != speed {
            log::warn!("modulation speed range is {}-{}, got {}", MOD_SPEED_MIN, MOD_SPEED_MAX, speed);
        }
        self.mod_speed = s;
        s
    }

    /// Random offset of up to ±`dither_hz` added to every tick's output.
    /// Zero turns it off.
    pub fn set_dither(self: &mut Self, dither_hz: u32) {
        self.dither_hz = dither_hz;
    }

    /// RF off, modulation stopped.
    pub fn disable_output<T>(self: &mut Self, synth: &mut Synthesizer<T>) -> Result<(), Error>
    where
        T: RegisterTransport,
    {
        synth.disable_output()?;
        self.waveform = Waveform::None;
        Ok(())
    }

    /// One control loop iteration. `elapsed` is the real time since the
    /// previous tick, used by the constant-rate glide.
    ///
    /// At most one register commit happens per tick: a sigma-delta power
    /// step goes out with the retune or lock assist when there is one. A
    /// failed retune leaves the committed frequency as it was and is
    /// retried on the next tick.
    pub fn tick<T, R>(
        self: &mut Self,
        synth: &mut Synthesizer<T>,
        rng: &mut R,
        elapsed: Duration,
    ) -> Result<TickOutcome, Error>
    where
        T: RegisterTransport,
        R: RngCore,
    {
        synth.stage_sigma_delta();

        if self.waveform == Waveform::None && self.glide == GlideLaw::None {
            synth.flush()?;
            return Ok(TickOutcome::Idle);
        }

        let len = self.table.len().max(1);
        self.phase = (self.phase + self.mod_speed as usize) % len;

        if let Some(sp) = self.waveform_setpoint(rng, len) {
            self.setpoint = sp;
            self.start = self.current;
        }

        let previous = self.current;
        self.current = self.advance(elapsed);
        // arrived, or too close for the glide to make progress
        let settled = self.current == self.setpoint || self.current == previous;

        let mut f = self.current.round();
        if self.dither_hz > 0 {
            let d = self.dither_hz as i64;
            f = f.saturating_add(Hz::saturating_from_num(rng.gen_range(-d..=d)));
        }
        let f_hz = to_hz(f);

        if self.committed != Some(f_hz) {
            log::trace!("tick: {:?} Hz -> {} Hz", self.committed, f_hz);
            synth.optimise_frequency(f_hz, false)?;
            self.committed = Some(f_hz);
            self.locked = false;
            Ok(TickOutcome::Retuned(f_hz))
        } else if !settled {
            synth.flush()?;
            Ok(TickOutcome::Settling)
        } else if !self.locked {
            synth.lock_frequency()?;
            self.locked = true;
            Ok(TickOutcome::LockAssist)
        } else {
            synth.flush()?;
            Ok(TickOutcome::Holding)
        }
    }

    fn waveform_setpoint<R>(self: &Self, rng: &mut R, len: usize) -> Option<Hz>
    where
        R: RngCore,
    {
        // position inside the period scaled by the amplitude
        let swept = |amp: i32| Hz::saturating_from_num(amp as i64 * self.phase as i64) / len as i64;

        let offset = match self.waveform {
            Waveform::None => return None,
            Waveform::LinearRamp(amp) => swept(amp),
            Waveform::Sine(amp) => {
                let s = self.table.get(self.phase).copied().unwrap_or(0) as i64;
                Hz::saturating_from_num(s * amp as i64) / TABLE_SCALE
            }
            Waveform::Triangle(amp) => {
                // shape on the magnitude, negative amplitudes mirror it below base
                let period = Hz::saturating_from_num(amp).abs();
                let t = swept(amp).abs();
                let tri = if t <= period / 2 {
                    t * 2
                } else {
                    (period - t) * 2
                };
                if amp < 0 {
                    -tri
                } else {
                    tri
                }
            }
            Waveform::Random(amp) => {
                let r = rng.gen_range(0..(amp as i64).abs());
                Hz::saturating_from_num(if amp < 0 { -r } else { r })
            }
        };

        Some(self.base.saturating_add(offset))
    }

    fn advance(self: &mut Self, elapsed: Duration) -> Hz {
        let diff = self.setpoint - self.current;

        match self.glide {
            GlideLaw::None => self.setpoint,
            GlideLaw::Exponential(k) => self.current + diff / k as i64,
            GlideLaw::Linear(ticks) => {
                let step = (self.setpoint - self.start) / ticks as i64;
                if step != Hz::ZERO && diff.abs() > step.abs() {
                    self.current + step
                } else {
                    self.setpoint
                }
            }
            GlideLaw::ConstantRate(secs) => {
                if self.setpoint != self.rate_setpoint {
                    self.rate = diff.abs() / secs as i64;
                    self.rate_setpoint = self.setpoint;
                }

                let dt = Hz::saturating_from_num(elapsed.as_micros()) / 1_000_000;
                let advance = self.rate.saturating_mul(dt).max(Hz::ONE);

                if diff.abs() <= advance {
                    self.setpoint
                } else if diff > Hz::ZERO {
                    self.current + advance
                } else {
                    self.current - advance
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SynthesizerConfig;
    use rand::{rngs::StdRng, SeedableRng};

    #[derive(Default)]
    struct Recorder {
        writes: usize,
    }

    impl RegisterTransport for Recorder {
        fn write_register(self: &mut Self, _index: u8, _w: u32) -> Result<(), Error> {
            self.writes += 1;
            Ok(())
        }

        fn set_chip_enable(self: &mut Self, _enabled: bool) -> Result<(), Error> {
            Ok(())
        }
    }

    const TABLE: [i16; 8] = [0, 23_170, 32_767, 23_170, 0, -23_170, -32_767, -23_170];

    fn setup(f_hz: u64) -> (Synthesizer<Recorder>, GlideController<'static>) {
        let mut synth = Synthesizer::new(Recorder::default(), SynthesizerConfig::default());
        let mut ctl = GlideController::new(&TABLE, 0);
        ctl.set_frequency(&mut synth, f_hz).unwrap();
        (synth, ctl)
    }

    fn tick(synth: &mut Synthesizer<Recorder>, ctl: &mut GlideController) -> TickOutcome {
        let mut rng = StdRng::seed_from_u64(1);
        ctl.tick(synth, &mut rng, Duration::from_millis(10)).unwrap()
    }

    #[test]
    fn idle_without_laws() {
        let (mut synth, mut ctl) = setup(100_000_000);
        assert_eq!(synth.plan().map(|p| p.achieved_hz), Some(100_000_000));
        let writes = synth.transport().writes;
        assert_eq!(tick(&mut synth, &mut ctl), TickOutcome::Idle);
        assert_eq!(synth.transport().writes, writes);
        assert_eq!(ctl.phase(), 0);
    }

    #[test]
    fn linear_glide_takes_glide_ticks() {
        let (mut synth, mut ctl) = setup(100_000_000);
        ctl.set_glide(GlideLaw::Linear(100));
        ctl.set_frequency(&mut synth, 100_100_000).unwrap();

        let mut last = 100_000_000;
        let mut ticks = 0;
        loop {
            match tick(&mut synth, &mut ctl) {
                TickOutcome::Retuned(f) => {
                    assert!(f > last, "{} after {}", f, last);
                    last = f;
                    ticks += 1;
                }
                TickOutcome::LockAssist => break,
                other => panic!("unexpected {:?}", other),
            }
            assert!(ticks <= 101);
        }

        assert_eq!(ticks, 100);
        assert_eq!(last, 100_100_000);
        assert_eq!(synth.plan().map(|p| p.achieved_hz), Some(100_100_000));
    }

    #[test]
    fn lock_assist_once_per_settling() {
        let (mut synth, mut ctl) = setup(100_000_000);
        ctl.set_glide(GlideLaw::Linear(2));
        ctl.set_frequency(&mut synth, 100_001_000).unwrap();

        assert_eq!(tick(&mut synth, &mut ctl), TickOutcome::Retuned(100_000_500));
        assert_eq!(tick(&mut synth, &mut ctl), TickOutcome::Retuned(100_001_000));
        assert!(!ctl.is_locked());

        let writes = synth.transport().writes;
        assert_eq!(tick(&mut synth, &mut ctl), TickOutcome::LockAssist);
        assert_eq!(synth.transport().writes, writes + 6);
        assert!(ctl.is_locked());

        assert_eq!(tick(&mut synth, &mut ctl), TickOutcome::Holding);
        assert_eq!(tick(&mut synth, &mut ctl), TickOutcome::Holding);
        assert_eq!(synth.transport().writes, writes + 6);

        // a new setpoint re-arms it
        ctl.set_frequency(&mut synth, 100_002_000).unwrap();
        assert_eq!(tick(&mut synth, &mut ctl), TickOutcome::Retuned(100_001_500));
        assert!(!ctl.is_locked());
    }

    #[test]
    fn exponential_glide_converges() {
        let (mut synth, mut ctl) = setup(100_000_000);
        ctl.set_glide(GlideLaw::Exponential(4));
        ctl.set_frequency(&mut synth, 100_010_000).unwrap();

        assert_eq!(tick(&mut synth, &mut ctl), TickOutcome::Retuned(100_002_500));
        let mut outcomes = Vec::new();
        for _ in 0..200 {
            let out = tick(&mut synth, &mut ctl);
            if let TickOutcome::Retuned(f) = out {
                assert!(!outcomes.contains(&TickOutcome::LockAssist), "retune to {} after lock assist", f);
                assert!(f <= 100_010_000);
            }
            outcomes.push(out);
        }

        // output reaches the setpoint before the glide stops moving
        assert!(outcomes.contains(&TickOutcome::Settling));
        let assists = outcomes.iter().filter(|o| **o == TickOutcome::LockAssist).count();
        assert_eq!(assists, 1);
        assert_eq!(outcomes.last(), Some(&TickOutcome::Holding));
        assert_eq!(ctl.committed_hz(), Some(100_010_000));
        assert_eq!(ctl.current_hz(), 100_010_000);
    }

    #[test]
    fn constant_rate_snaps_onto_setpoint() {
        let (mut synth, mut ctl) = setup(100_000_000);
        ctl.set_frequency(&mut synth, 100_000_000).unwrap();
        ctl.set_glide(GlideLaw::ConstantRate(10));
        ctl.set_frequency(&mut synth, 100_100_000).unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        let mut last = 100_000_000;
        let mut reached = false;
        for _ in 0..200 {
            let out = ctl.tick(&mut synth, &mut rng, Duration::from_millis(100)).unwrap();
            if let TickOutcome::Retuned(f) = out {
                assert!(f > last && f <= 100_100_000);
                last = f;
            }
            if ctl.current_hz() == 100_100_000 {
                reached = true;
                break;
            }
        }
        assert!(reached);

        // stays put
        assert_eq!(ctl.tick(&mut synth, &mut rng, Duration::from_millis(100)), Ok(TickOutcome::LockAssist));
        assert_eq!(ctl.tick(&mut synth, &mut rng, Duration::from_millis(100)), Ok(TickOutcome::Holding));
        assert_eq!(ctl.current_hz(), 100_100_000);
    }

    #[test]
    fn constant_rate_moves_at_least_one_hz() {
        let (mut synth, mut ctl) = setup(100_000_000);
        ctl.set_glide(GlideLaw::ConstantRate(1));
        ctl.set_frequency(&mut synth, 100_000_003).unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        for f in 100_000_001..=100_000_003 {
            assert_eq!(ctl.tick(&mut synth, &mut rng, Duration::ZERO), Ok(TickOutcome::Retuned(f)));
        }
        assert_eq!(ctl.tick(&mut synth, &mut rng, Duration::ZERO), Ok(TickOutcome::LockAssist));
    }

    #[test]
    fn laws_replace_each_other() {
        let (mut synth, mut ctl) = setup(100_000_000);
        ctl.set_dither(20);
        ctl.set_waveform(Waveform::Sine(1_000));
        ctl.set_waveform(Waveform::Triangle(500));
        assert_eq!(ctl.waveform(), Waveform::Triangle(500));

        ctl.set_glide(GlideLaw::Linear(10));
        ctl.set_glide(GlideLaw::Exponential(4));
        assert_eq!(ctl.glide(), GlideLaw::Exponential(4));
        assert_eq!(ctl.waveform(), Waveform::Triangle(500));

        ctl.set_glide(GlideLaw::Linear(0));
        assert_eq!(ctl.glide(), GlideLaw::None);
        ctl.set_waveform(Waveform::Random(0));
        assert_eq!(ctl.waveform(), Waveform::None);

        ctl.set_waveform(Waveform::LinearRamp(1_000));
        ctl.set_frequency(&mut synth, 101_000_000).unwrap();
        assert_eq!(ctl.waveform(), Waveform::None);
        assert_eq!(ctl.dither_hz(), 20);
    }

    #[test]
    fn mod_speed_is_clamped() {
        let mut ctl = GlideController::new(&TABLE, 100_000_000);
        assert_eq!(ctl.mod_speed(), 2);
        assert_eq!(ctl.set_mod_speed(0), 1);
        assert_eq!(ctl.set_mod_speed(5000), 1024);
        assert_eq!(ctl.set_mod_speed(3), 3);
    }

    #[test]
    fn sine_follows_table() {
        let (mut synth, mut ctl) = setup(100_000_000);
        ctl.set_mod_speed(1);
        ctl.set_waveform(Waveform::Sine(65_536));

        let mut seen = Vec::new();
        for _ in 0..TABLE.len() {
            match tick(&mut synth, &mut ctl) {
                TickOutcome::Retuned(f) => seen.push(f as i64 - 100_000_000),
                _ => seen.push(0),
            }
        }
        // phase 1, 2, .. 7, then wraps to 0
        assert_eq!(seen, [23_170, 32_767, 23_170, 0, -23_170, -32_767, -23_170, 0]);
        assert_eq!(ctl.phase(), 0);
    }

    #[test]
    fn triangle_rises_and_falls() {
        let (mut synth, mut ctl) = setup(100_000_000);
        ctl.set_mod_speed(1);
        ctl.set_waveform(Waveform::Triangle(8_000));

        let mut seen = Vec::new();
        for _ in 0..TABLE.len() {
            tick(&mut synth, &mut ctl);
            seen.push(ctl.current_hz() - 100_000_000);
        }
        assert_eq!(seen, [2_000, 4_000, 6_000, 8_000, 6_000, 4_000, 2_000, 0]);
    }

    #[test]
    fn linear_ramp_is_a_sawtooth() {
        let (mut synth, mut ctl) = setup(100_000_000);
        ctl.set_mod_speed(2);
        ctl.set_waveform(Waveform::LinearRamp(-8_000));

        let mut seen = Vec::new();
        for _ in 0..4 {
            tick(&mut synth, &mut ctl);
            seen.push(100_000_000 - ctl.current_hz());
        }
        assert_eq!(seen, [2_000, 4_000, 6_000, 0]);
    }

    #[test]
    fn random_steps_stay_in_range() {
        let (mut synth, mut ctl) = setup(100_000_000);
        ctl.set_waveform(Waveform::Random(5_000));

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            ctl.tick(&mut synth, &mut rng, Duration::from_millis(10)).unwrap();
            let f = ctl.current_hz();
            assert!((100_000_000..100_005_000).contains(&f), "{}", f);
            assert_eq!(ctl.committed_hz(), Some(f));
        }

        ctl.set_waveform(Waveform::Random(-5_000));
        for _ in 0..50 {
            ctl.tick(&mut synth, &mut rng, Duration::from_millis(10)).unwrap();
            let f = ctl.current_hz();
            assert!(f > 99_995_000 && f <= 100_000_000, "{}", f);
        }
    }

    #[test]
    fn dither_is_not_latched() {
        let (mut synth, mut ctl) = setup(100_000_000);
        ctl.set_glide(GlideLaw::Exponential(2));
        ctl.set_dither(50);

        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            ctl.tick(&mut synth, &mut rng, Duration::from_millis(10)).unwrap();
            let f = ctl.committed_hz().unwrap();
            assert!(f >= 99_999_950 && f <= 100_000_050, "{}", f);
            assert_eq!(ctl.current_hz(), 100_000_000);
        }
    }

    #[test]
    fn failed_retune_keeps_committed() {
        let (mut synth, mut ctl) = setup(100_000_000);
        ctl.set_glide(GlideLaw::Linear(1));
        ctl.set_frequency(&mut synth, 10_000_000).unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            ctl.tick(&mut synth, &mut rng, Duration::from_millis(10)),
            Err(Error::InvalidOutputFrequency)
        );
        assert_eq!(ctl.committed_hz(), Some(100_000_000));
        assert_eq!(synth.plan().map(|p| p.achieved_hz), Some(100_000_000));
    }

    #[test]
    fn direct_set_uses_the_tick_step() {
        let (mut synth, mut ctl) = setup(100_000_000);
        ctl.set_frequency(&mut synth, 102_500_000).unwrap();
        assert_eq!(synth.plan().map(|p| p.channel_step_hz), Some(500_000));

        ctl.set_glide(GlideLaw::Linear(1));
        ctl.set_frequency(&mut synth, 102_000_000).unwrap();
        assert_eq!(tick(&mut synth, &mut ctl), TickOutcome::Retuned(102_000_000));
        assert_eq!(synth.plan().map(|p| p.channel_step_hz), Some(500_000));
    }

    #[test]
    fn first_tick_commits_a_full_plan() {
        let mut synth = Synthesizer::new(Recorder::default(), SynthesizerConfig::default());
        let mut ctl = GlideController::new(&TABLE, 100_000_000);
        ctl.set_glide(GlideLaw::Linear(10));
        assert_eq!(ctl.committed_hz(), None);

        assert_eq!(tick(&mut synth, &mut ctl), TickOutcome::Retuned(100_000_000));
        assert_eq!(synth.plan().map(|p| p.achieved_hz), Some(100_000_000));
        assert_eq!(synth.f_out_hz(), 100_000_000);
        assert_eq!(tick(&mut synth, &mut ctl), TickOutcome::LockAssist);
    }

    #[test]
    fn one_commit_per_tick_with_sigma_delta() {
        let (mut synth, mut ctl) = setup(100_000_000);
        synth.set_sigma_delta_amplitude(Some(u16::MAX)).unwrap();
        ctl.set_glide(GlideLaw::Linear(2));
        ctl.set_frequency(&mut synth, 100_001_000).unwrap();

        let expected = [
            TickOutcome::Retuned(100_000_500),
            TickOutcome::Retuned(100_001_000),
            TickOutcome::LockAssist,
            TickOutcome::Holding,
        ];
        for out in expected.iter() {
            let writes = synth.transport().writes;
            assert_eq!(tick(&mut synth, &mut ctl), *out);
            assert_eq!(synth.transport().writes, writes + 6, "{:?}", out);
        }
    }
}
