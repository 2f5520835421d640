//! Device pins / register transport

use embedded_hal::{
    blocking::{delay::*, spi::*},
    digital::v2::OutputPin,
};

use crate::errors::*;
use crate::register::*;

/// Moves register words to the chip.
pub trait RegisterTransport {
    /// Writes a single 32-bit word to latch `index` (0..=5).
    fn write_register(self: &mut Self, index: u8, w: u32) -> Result<(), Error>;

    /// Drives the chip enable line.
    fn set_chip_enable(self: &mut Self, enabled: bool) -> Result<(), Error>;

    /// Writes all control registers out, R5 first and R0 last.
    /// Writing R0 restarts the synthesis, everything else must be in place by then.
    fn write_register_set(self: &mut Self, rs: &RegisterSet) -> Result<(), Error> {
        let words = rs.to_words();
        for i in (0..words.len()).rev() {
            self.write_register(i as u8, words[i])?;
        }
        Ok(())
    }
}

/// ADF4351 device
pub struct Adf4351<CE, LE, SPI, DELAY> {
    spi: SPI,
    pin_ce: CE,
    pin_le: LE,
    delay: DELAY,
}

impl<CE, LE, SPI, DELAY> Adf4351<CE, LE, SPI, DELAY>
where
    CE: OutputPin,
    LE: OutputPin,
    SPI: Write<u8>,
    DELAY: DelayUs<u16>,
{
    /// Creates the device (unconfigured, no output).
    ///
    /// `spi` - SPI device (`MOSI` => `DATA`, `CLK` => `CLK`, `CPHA` = 0)
    /// `pin_ce` - "chip enable" pin
    /// `pin_le` - "load enable" pin
    /// `delay` - LE pulse timing
    pub fn new(spi: SPI, pin_ce: CE, pin_le: LE, delay: DELAY) -> Self {
        Adf4351 { spi, pin_ce, pin_le, delay }
    }

    /// Gives the bus, pins and delay back.
    pub fn release(self) -> (SPI, CE, LE, DELAY) {
        (self.spi, self.pin_ce, self.pin_le, self.delay)
    }

    /// When LE goes high, the data stored in the 32-bit shift register is
    /// loaded into the register that is selected by the three control bits.
    #[inline(always)]
    fn load_enable(self: &mut Self) -> Result<(), Error> {
        self.pin_le.set_high().map_err(|_| Error::Pin)
    }

    /// Disable register load from shift register
    #[inline(always)]
    fn load_disable(self: &mut Self) -> Result<(), Error> {
        self.pin_le.set_low().map_err(|_| Error::Pin)
    }
}

impl<CE, LE, SPI, DELAY> RegisterTransport for Adf4351<CE, LE, SPI, DELAY>
where
    CE: OutputPin,
    LE: OutputPin,
    SPI: Write<u8>,
    DELAY: DelayUs<u16>,
{
    /// Data is clocked into the 32-bit shift register
    /// on each rising edge of CLK, MSB first, then latched by an LE pulse.
    ///
    /// Blocking implementation.
    fn write_register(self: &mut Self, index: u8, w: u32) -> Result<(), Error> {
        debug_assert_eq!(w & 0b111, index as u32);

        self.spi.write(&w.to_be_bytes()).map_err(|_| Error::Spi)?;

        self.delay.delay_us(5);
        self.load_enable()?;
        self.delay.delay_us(10);
        self.load_disable()?;
        self.delay.delay_us(5);

        log::trace!("R{} <- {:#010x}", index, w);
        Ok(())
    }

    /// High powers the device up, low powers it down and puts the charge
    /// pump into three-state mode. Register contents are kept.
    fn set_chip_enable(self: &mut Self, enabled: bool) -> Result<(), Error> {
        if enabled {
            self.pin_ce.set_high()
        } else {
            self.pin_ce.set_low()
        }
        .map_err(|_| Error::Pin)
    }
}
