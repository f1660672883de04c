//! Core utilities for the DQPSK modulator workspace
//!
//! This crate provides the fundamental types shared by the modem and its front end:
//! - BitBuffer for holding and parsing burst bits
//! - BitParseErr for bit-string parsing failures
//! - Logging setup and debug macros

pub mod bit_parse_error;
pub mod bitbuffer;
pub mod debug;

// Re-export commonly used items
pub use bit_parse_error::BitParseErr;
pub use bitbuffer::BitBuffer;
