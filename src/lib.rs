#![cfg_attr(not(test), no_std)]

//! [ADF4351](https://www.analog.com/en/products/adf4351.html) signal generator.
//!
//! Divider planning for arbitrary output frequencies, register packing,
//! an SPI driver and a control loop for frequency glides and modulation.

pub mod constants;
pub mod register;
pub mod errors;
pub mod config;
pub mod frequency;
pub mod steps;
pub mod device;
pub mod amplitude;
pub mod synth;
pub mod glide;
