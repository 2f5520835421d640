//! Errors

/// Driver errors, one variant per failure reason.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// REFin or the resulting PFD frequency is outside device limits
    InvalidReferenceFrequency,
    /// Requested output frequency is outside device limits
    InvalidOutputFrequency,
    /// Fractional modulus outside 2..=4095
    InvalidModulus(u32),
    /// FRAC outside 0..=MOD-1
    InvalidFraction(u32),
    /// INT outside the prescaler dependent range
    InvalidInteger(u32),
    /// Zero channel step
    InvalidChannelStep,
    /// No candidate channel step produced a valid divider plan
    NoStepFound,
    /// SPI write failed
    Spi,
    /// GPIO pin failed
    Pin,
}

/// Coarse error classes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Requested or reference frequency outside device limits
    OutOfRange,
    /// MOD / FRAC / INT validation failure
    InvalidDivider,
    /// Step search exhausted all candidates
    NoStepFound,
    /// Register write did not complete
    TransportFailure,
}

impl Error {
    pub fn kind(self: &Self) -> ErrorKind {
        match self {
            Error::InvalidReferenceFrequency | Error::InvalidOutputFrequency => ErrorKind::OutOfRange,
            Error::InvalidModulus(_)
            | Error::InvalidFraction(_)
            | Error::InvalidInteger(_)
            | Error::InvalidChannelStep => ErrorKind::InvalidDivider,
            Error::NoStepFound => ErrorKind::NoStepFound,
            Error::Spi | Error::Pin => ErrorKind::TransportFailure,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidReferenceFrequency => f.write_str("reference frequency out of range"),
            Error::InvalidOutputFrequency => f.write_str("output frequency out of range"),
            Error::InvalidModulus(m) => write!(f, "MOD out of range: {}", m),
            Error::InvalidFraction(fr) => write!(f, "FRAC out of range: {}", fr),
            Error::InvalidInteger(n) => write!(f, "INT out of range: {}", n),
            Error::InvalidChannelStep => f.write_str("channel step must be non-zero"),
            Error::NoStepFound => f.write_str("no channel step satisfies the divider limits"),
            Error::Spi => f.write_str("SPI write failed"),
            Error::Pin => f.write_str("pin write failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(Error::InvalidOutputFrequency.kind(), ErrorKind::OutOfRange);
        assert_eq!(Error::InvalidFraction(7).kind(), ErrorKind::InvalidDivider);
        assert_eq!(Error::NoStepFound.kind(), ErrorKind::NoStepFound);
        assert_eq!(Error::Pin.kind(), ErrorKind::TransportFailure);
    }
}
