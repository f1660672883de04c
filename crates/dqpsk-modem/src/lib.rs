//! Differential 8-PSK (pi/4-DQPSK) symbol mapping
//!
//! Turns burst bits into complex baseband symbols. Each dibit selects a phase
//! rotation of +-pi/4 or +-3pi/4 relative to the previous symbol, starting from
//! an implicit reference symbol at phase 0. Pulse shaping, upconversion and
//! everything downstream live elsewhere.

pub mod dsp_types;
pub mod error;
pub mod iq_writer;
pub mod modulator;

pub use dsp_types::{ComplexSample, RealSample};
pub use error::ModulatorError;
pub use iq_writer::{IqFormat, write_symbols};
pub use modulator::{DqpskMapper, Modulator, encode, encode_bitarr, encode_bitbuffer, encode_into};
