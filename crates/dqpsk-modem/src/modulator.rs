use dqpsk_core::BitBuffer;

use crate::dsp_types::*;
use crate::error::ModulatorError;

/// Phase change per dibit in multiples of pi/4,
/// indexed by dibit value (first bit is the high-order bit).
pub const PHASE_DELTAS: [i8; 4] = [
     1, // 00
     3, // 01
    -1, // 10
    -3, // 11
];

/// Number of phase states, the accumulator wraps modulo this.
pub const NUM_PHASES: u8 = 8;

const A: RealSample = sample_consts::FRAC_1_SQRT_2;

/// Look-up table to map phase (in multiples of pi/4) to constellation points,
/// exp(j*k*pi/4) for k = 0..7
pub const IQ_TABLE: [ComplexSample; 8] = [
    ComplexSample { re:  1.0, im:  0.0 },
    ComplexSample { re:    A, im:    A },
    ComplexSample { re:  0.0, im:  1.0 },
    ComplexSample { re:   -A, im:    A },
    ComplexSample { re: -1.0, im:  0.0 },
    ComplexSample { re:   -A, im:   -A },
    ComplexSample { re:  0.0, im: -1.0 },
    ComplexSample { re:    A, im:   -A },
];

/// Implicit symbol preceding the first data-bearing symbol of every burst
pub const REFERENCE_SYMBOL: ComplexSample = IQ_TABLE[0];

/// Dibit value for a pair of bits, `bit0` being the high-order bit.
#[inline]
pub fn dibit(bit0: bool, bit1: bool) -> u8 {
    ((bit0 as u8) << 1) | bit1 as u8
}

/// Number of symbols produced for `num_bits` input bits, reference symbol included.
/// Only meaningful for even `num_bits`.
#[inline]
pub fn symbol_count(num_bits: usize) -> usize {
    num_bits / 2 + 1
}

/// Differential phase accumulator. Each dibit rotates the phase by
/// an odd multiple of pi/4, so consecutive symbols alternate between
/// the two QPSK constellations.
#[derive(Debug, Default, Clone)]
pub struct DqpskMapper {
    phase: u8,
}

impl DqpskMapper {
    pub fn new() -> Self {
        Self { phase: 0 }
    }

    /// Current phase state in [0, 8), in multiples of pi/4
    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Advance the phase by the delta for (bit0, bit1) and return the new constellation point.
    pub fn symbol(&mut self, bit0: bool, bit1: bool) -> ComplexSample {
        let delta = PHASE_DELTAS[dibit(bit0, bit1) as usize];
        // rem_euclid keeps the result non-negative for negative deltas
        self.phase = (self.phase as i8 + delta).rem_euclid(NUM_PHASES as i8) as u8;
        IQ_TABLE[self.phase as usize]
    }
}

fn check_len(num_bits: usize) -> Result<(), ModulatorError> {
    if num_bits % 2 != 0 {
        tracing::debug!("rejecting odd-length bitstream of {} bits", num_bits);
        return Err(ModulatorError::InvalidInputLength { len: num_bits });
    }
    Ok(())
}

/// Appends the reference symbol followed by one symbol per dibit.
/// Returns the number of symbols appended.
fn modulate_dibits(dibits: impl Iterator<Item = (bool, bool)>, num_bits: usize, out: &mut Vec<ComplexSample>) -> usize {
    let num_symbols = symbol_count(num_bits);
    out.reserve(num_symbols);
    out.push(REFERENCE_SYMBOL);

    // Fresh accumulator, no phase carries over between bursts
    let mut mapper = DqpskMapper::new();
    for (bit0, bit1) in dibits {
        let sym = mapper.symbol(bit0, bit1);
        tracing::trace!("dibit {} -> phase {}", dibit(bit0, bit1), mapper.phase());
        out.push(sym);
    }

    tracing::debug!("modulated {} bits into {} symbols, final phase {}", num_bits, num_symbols, mapper.phase());
    num_symbols
}

/// Modulate a burst into symbols: the reference symbol (1+0j) followed
/// by one differentially encoded symbol per dibit.
/// Fails with ModulatorError::InvalidInputLength if `bits` has odd length.
pub fn encode(bits: &[bool]) -> Result<Vec<ComplexSample>, ModulatorError> {
    let mut out = Vec::new();
    encode_into(bits, &mut out)?;
    Ok(out)
}

/// Like encode(), but appends to `out`, returning the number of symbols appended.
/// On error, `out` is left untouched.
pub fn encode_into(bits: &[bool], out: &mut Vec<ComplexSample>) -> Result<usize, ModulatorError> {
    check_len(bits.len())?;
    let dibits = bits.chunks_exact(2).map(|pair| (pair[0], pair[1]));
    Ok(modulate_dibits(dibits, bits.len(), out))
}

/// Like encode(), for bit arrays holding one bit per byte. Any non-zero byte is a 1.
pub fn encode_bitarr(bits: &[u8]) -> Result<Vec<ComplexSample>, ModulatorError> {
    check_len(bits.len())?;
    let mut out = Vec::new();
    let dibits = bits.chunks_exact(2).map(|pair| (pair[0] != 0, pair[1] != 0));
    modulate_dibits(dibits, bits.len(), &mut out);
    Ok(out)
}

/// Like encode(), for all bits of a BitBuffer. The buffer position is not used or moved.
pub fn encode_bitbuffer(buf: &BitBuffer) -> Result<Vec<ComplexSample>, ModulatorError> {
    check_len(buf.get_len())?;
    let mut out = Vec::new();
    let mut bits = buf.iter_bits();
    let dibits = std::iter::from_fn(|| Some((bits.next()?, bits.next()?)));
    modulate_dibits(dibits, buf.get_len(), &mut out);
    Ok(out)
}

/// Stateless handle around the encode functions, for callers that
/// want to pass a modulator around as a value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Modulator;

impl Modulator {
    pub fn encode(&self, bits: &[bool]) -> Result<Vec<ComplexSample>, ModulatorError> {
        encode(bits)
    }

    pub fn encode_into(&self, bits: &[bool], out: &mut Vec<ComplexSample>) -> Result<usize, ModulatorError> {
        encode_into(bits, out)
    }

    pub fn encode_bitarr(&self, bits: &[u8]) -> Result<Vec<ComplexSample>, ModulatorError> {
        encode_bitarr(bits)
    }

    pub fn encode_bitbuffer(&self, buf: &BitBuffer) -> Result<Vec<ComplexSample>, ModulatorError> {
        encode_bitbuffer(buf)
    }
}
