use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ModulatorError {
    /// Each symbol takes a dibit, so the number of input bits must be even.
    #[error("cannot modulate odd-length bitstream of {len} bits")]
    InvalidInputLength { len: usize },
}
