//! Data types used for signal processing

pub type RealSample = f64;
pub use std::f64::consts as sample_consts;

pub type ComplexSample = num_complex::Complex<RealSample>;
