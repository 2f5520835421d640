//! Synthesizer controller
//!
//! Owns the register transport, the persistent configuration and the
//! shadow copy of the six control registers. Every operation computes a
//! new register set first and replaces the shadow copy only once all six
//! words went out, so a rejected request leaves the device untouched.

use fixed::types::I32F32;

use crate::{
    amplitude::*, config::*, constants::*, device::*, errors::*, frequency::*, register::*,
    steps::*,
};

pub struct Synthesizer<T> {
    transport: T,
    config: SynthesizerConfig,
    registers: RegisterSet,
    plan: Option<FrequencyPlan>,
    steps: AllowedStepSet,
    enabled: bool,
    sigma_delta: Option<SigmaDelta>,
    /// Sigma-delta power level waiting for the next commit
    pending_power: Option<u8>,
}

impl<T> Synthesizer<T>
where
    T: RegisterTransport,
{
    /// Nothing is written until the first frequency or output change.
    pub fn new(transport: T, config: SynthesizerConfig) -> Self {
        Synthesizer {
            transport,
            config,
            registers: RegisterSet::default(),
            plan: None,
            steps: DEFAULT_STEPS,
            enabled: false,
            sigma_delta: None,
            pending_power: None,
        }
    }

    /// Replaces the step list used by [`Synthesizer::optimise_frequency`].
    pub fn with_steps(mut self: Self, steps: AllowedStepSet) -> Self {
        self.steps = steps;
        self
    }

    pub fn config(self: &Self) -> &SynthesizerConfig {
        &self.config
    }

    /// Last committed register values
    pub fn registers(self: &Self) -> &RegisterSet {
        &self.registers
    }

    /// Last committed divider plan
    pub fn plan(self: &Self) -> Option<&FrequencyPlan> {
        self.plan.as_ref()
    }

    /// Output frequency as programmed in the registers, Hz
    pub fn f_out_hz(self: &Self) -> u64 {
        f_out_hz(&self.config, &self.registers)
    }

    pub fn is_enabled(self: &Self) -> bool {
        self.enabled
    }

    /// Sigma-delta target level, if running
    pub fn sigma_delta_level(self: &Self) -> Option<u16> {
        self.sigma_delta.map(|sd| sd.level())
    }

    pub fn transport(self: &Self) -> &T {
        &self.transport
    }

    /// Consumes the controller, returning the transport.
    pub fn release(self: Self) -> T {
        self.transport
    }

    /// Writes R5..R0 and keeps `rs` as the new shadow copy. A staged
    /// sigma-delta power level goes out with it.
    fn commit(self: &mut Self, rs: RegisterSet) -> Result<(), Error> {
        let rs = match self.pending_power {
            Some(level) => rs.set(OutputPower(level)),
            None => rs,
        };
        self.transport.write_register_set(&rs)?;
        self.registers = rs;
        self.pending_power = None;
        log::debug!("registers committed\n{}", rs);
        Ok(())
    }

    fn install(self: &mut Self, p: FrequencyPlan, phase: Option<u16>) -> Result<&FrequencyPlan, Error> {
        let mut rs = p.apply(&self.config, self.registers, phase);
        if self.sigma_delta.is_some() {
            rs = rs.set(self.registers.get::<OutputPower, _>());
        }
        self.commit(rs)?;

        if !p.is_exact() {
            log::warn!(
                "output freq {} Hz differs from requested {} Hz",
                p.achieved_hz,
                p.requested_hz
            );
        }
        log::info!(
            "{} Hz: INT {} FRAC {} MOD {} RF div {} step {} Hz",
            p.achieved_hz,
            p.int,
            p.frac,
            p.modulus,
            p.rf_divider(),
            p.channel_step_hz
        );

        self.config.channel_step_hz = p.channel_step_hz;
        Ok(self.plan.insert(p))
    }

    /// Sets the output frequency with MOD derived from `channel_step_hz`,
    /// optionally resetting the output phase.
    pub fn set_frequency(
        self: &mut Self,
        f_out_hz: u64,
        channel_step_hz: u32,
        phase: Option<u16>,
    ) -> Result<&FrequencyPlan, Error> {
        let p = plan(f_out_hz, channel_step_hz, &self.config).map_err(|e| {
            log::warn!("{} Hz @ {} Hz step not set: {}", f_out_hz, channel_step_hz, e);
            e
        })?;
        self.install(p, phase)
    }

    /// Sets the output frequency, searching the allowed steps for one the
    /// dividers accept. With `use_gcd` gcd(f, REFin) is tried first.
    pub fn optimise_frequency(self: &mut Self, f_out_hz: u64, use_gcd: bool) -> Result<&FrequencyPlan, Error> {
        let p = StepResolver::new(self.steps, use_gcd)
            .resolve(f_out_hz, &self.config)
            .map_err(|e| {
                log::warn!("{} Hz not set: {}", f_out_hz, e);
                e
            })?;
        self.install(p, None)
    }

    /// New REFin frequency, Hz. Takes effect on the next frequency change.
    pub fn set_reference_frequency(self: &mut Self, ref_in_hz: u32) -> Result<(), Error> {
        self.config.set_ref_in(ref_in_hz)?;
        log::info!("reference set to {} Hz, PFD {} Hz", ref_in_hz, self.config.f_pfd().hz());
        Ok(())
    }

    /// Sets the output power step (0 = -4 dBm .. 3 = +5 dBm), stops the
    /// sigma-delta amplitude. Returns the level applied.
    pub fn set_amplitude(self: &mut Self, level: u8) -> Result<u8, Error> {
        let level = if level > OUTPUT_POWER_MAX {
            log::warn!("amplitude range is 0-{}, got {}", OUTPUT_POWER_MAX, level);
            OUTPUT_POWER_MAX
        } else {
            level
        };

        self.sigma_delta = None;
        self.pending_power = None;
        self.commit(self.registers.set(OutputPower(level)))?;
        self.config.power_level = level;
        log::info!("amplitude set to {}", level);
        Ok(level)
    }

    /// Starts (`Some`) or stops (`None`) the sigma-delta amplitude. A
    /// running modulator keeps its integrator when the level changes.
    /// Stopping it drops the output power to 0.
    pub fn set_sigma_delta_amplitude(self: &mut Self, level: Option<u16>) -> Result<(), Error> {
        match level {
            Some(l) => {
                match self.sigma_delta.as_mut() {
                    Some(sd) => sd.set_level(l),
                    None => self.sigma_delta = Some(SigmaDelta::new(l)),
                }
                log::info!("sigma-delta amplitude set to {}", l);
                self.step_sigma_delta().map(|_| ())
            }
            None => {
                log::info!("sigma-delta amplitude disabled");
                self.set_amplitude(0).map(|_| ())
            }
        }
    }

    /// One modulator step and a commit of the new power level. Returns
    /// the level written, `None` when the sigma-delta amplitude is off.
    pub fn step_sigma_delta(self: &mut Self) -> Result<Option<u8>, Error> {
        let level = self.stage_sigma_delta();
        self.flush()?;
        Ok(level)
    }

    /// One modulator step without writing anything. The level goes out
    /// with the next commit, or with [`Synthesizer::flush`].
    pub fn stage_sigma_delta(self: &mut Self) -> Option<u8> {
        let level = self.sigma_delta.as_mut()?.step();
        self.pending_power = Some(level);
        Some(level)
    }

    /// Commits a staged power level on its own. No-op when nothing is
    /// staged.
    pub fn flush(self: &mut Self) -> Result<(), Error> {
        match self.pending_power {
            Some(_) => self.commit(self.registers),
            None => Ok(()),
        }
    }

    /// Sets the 12-bit phase word, 0..=4095. Returns the value applied.
    pub fn set_phase(self: &mut Self, phase: u16) -> Result<u16, Error> {
        let phase = if phase > PHASE_MAX {
            log::warn!("phase range is 0-{}, got {}", PHASE_MAX, phase);
            PHASE_MAX
        } else {
            phase
        };
        self.commit(self.registers.set(Phase(phase)))?;
        Ok(phase)
    }

    /// Sets the phase in degrees, wrapped into [0, 360). Returns the
    /// wrapped angle.
    pub fn set_phase_angle(self: &mut Self, degrees: f32) -> Result<f32, Error> {
        let full = I32F32::from_num(360);
        let angle = match I32F32::checked_from_num(degrees) {
            Some(a) => a,
            None => {
                log::warn!("phase angle {} not representable, using 0", degrees);
                I32F32::ZERO
            }
        };

        let wrapped = angle.rem_euclid(full);
        if wrapped != angle {
            log::warn!("phase angle range is 0-360, {} wrapped to {}", angle, wrapped);
        }

        let word = (wrapped * 4096 / full).to_num::<u32>() % (PHASE_MAX as u32 + 1);
        self.set_phase(word as u16)?;
        Ok(wrapped.to_num::<f32>())
    }

    /// Chip enable high, RF and aux outputs on, lock detect pin digital.
    pub fn enable_output(self: &mut Self) -> Result<(), Error> {
        self.transport.set_chip_enable(true)?;
        let rs = self
            .registers
            .set(RfOutputEnable::Enabled)
            .set(AuxOutputEnable::Enabled)
            .set(LockDetectPin::DigitalLockDetect);
        self.commit(rs)?;
        self.enabled = true;
        log::info!("RF enabled");
        Ok(())
    }

    /// Chip enable low, RF and aux outputs off, lock detect pin low. Stops
    /// the sigma-delta amplitude.
    pub fn disable_output(self: &mut Self) -> Result<(), Error> {
        self.sigma_delta = None;
        self.pending_power = None;
        self.transport.set_chip_enable(false)?;
        let rs = self
            .registers
            .set(RfOutputEnable::Disabled)
            .set(AuxOutputEnable::Disabled)
            .set(LockDetectPin::Low);
        self.commit(rs)?;
        self.enabled = false;
        log::info!("RF disabled");
        Ok(())
    }

    /// Turns on cycle slip reduction once the loop holds a frequency.
    /// The next retune switches it off again.
    pub fn lock_frequency(self: &mut Self) -> Result<(), Error> {
        self.commit(self.registers.set(CycleSlipReduction::Enabled))?;
        log::debug!("lock assist on");
        Ok(())
    }
}
