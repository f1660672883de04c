use std::thread;

use dqpsk_core::{BitBuffer, debug};
use dqpsk_modem::modulator::{IQ_TABLE, PHASE_DELTAS, REFERENCE_SYMBOL, symbol_count};
use dqpsk_modem::{ComplexSample, Modulator, ModulatorError, encode, encode_bitarr, encode_bitbuffer};

const TOLERANCE: f64 = 1e-6;
const H: f64 = 0.70710678;

fn random_bits(len: usize) -> Vec<bool> {
    (0..len).map(|_| rand::random::<bool>()).collect()
}

fn bits(s: &str) -> Vec<bool> {
    s.chars().map(|c| c == '1').collect()
}

fn assert_symbols_close(got: &[ComplexSample], expected: &[(f64, f64)]) {
    assert_eq!(got.len(), expected.len(), "symbol count");
    for (i, (g, &(re, im))) in got.iter().zip(expected).enumerate() {
        assert!(
            (g.re - re).abs() < TOLERANCE && (g.im - im).abs() < TOLERANCE,
            "symbol {}: got {} expected {}+{}i", i, g, re, im
        );
    }
}

/// Index of the canonical constellation point matching `s`, if any
fn phase_of(s: &ComplexSample) -> Option<usize> {
    IQ_TABLE.iter().position(|p| (p - s).norm() < TOLERANCE)
}

#[test]
fn test_known_vectors() {
    debug::setup_logging_verbose();

    assert_symbols_close(&encode(&bits("00")).unwrap(), &[(1.0, 0.0), (H, H)]);
    assert_symbols_close(&encode(&bits("01")).unwrap(), &[(1.0, 0.0), (-H, H)]);
    assert_symbols_close(&encode(&bits("10")).unwrap(), &[(1.0, 0.0), (H, -H)]);
    assert_symbols_close(&encode(&bits("11")).unwrap(), &[(1.0, 0.0), (-H, -H)]);
    assert_symbols_close(&encode(&bits("0000")).unwrap(), &[(1.0, 0.0), (H, H), (0.0, 1.0)]);
}

#[test]
fn test_empty_input_gives_reference_only() {
    let symbols = encode(&[]).unwrap();
    assert_eq!(symbols, vec![ComplexSample::new(1.0, 0.0)]);
}

#[test]
fn test_odd_lengths_rejected() {
    for len in (1..64).step_by(2) {
        let err = encode(&random_bits(len)).unwrap_err();
        assert_eq!(err, ModulatorError::InvalidInputLength { len });
    }
    assert_eq!(encode_bitarr(&[1, 0, 1]), Err(ModulatorError::InvalidInputLength { len: 3 }));
    let buf = BitBuffer::from_bitstr("1").unwrap();
    assert_eq!(encode_bitbuffer(&buf), Err(ModulatorError::InvalidInputLength { len: 1 }));
}

#[test]
fn test_error_message() {
    let err = encode(&[true]).unwrap_err();
    assert_eq!(err.to_string(), "cannot modulate odd-length bitstream of 1 bits");
}

#[test]
fn test_length_law() {
    for len in (0..600).step_by(2) {
        let symbols = encode(&random_bits(len)).unwrap();
        assert_eq!(symbols.len(), len / 2 + 1);
        assert_eq!(symbols.len(), symbol_count(len));
        assert_eq!(symbols[0], REFERENCE_SYMBOL);
    }
}

#[test]
fn test_deterministic() {
    let input = random_bits(510);
    let a = encode(&input).unwrap();
    let b = encode(&input).unwrap();
    // Bit-for-bit equality, not just within tolerance
    assert_eq!(a, b);

    // A call on other data in between does not leak phase state
    encode(&random_bits(34)).unwrap();
    assert_eq!(encode(&input).unwrap(), a);
}

#[test]
fn test_symbols_on_canonical_points() {
    let symbols = encode(&random_bits(1000)).unwrap();
    for (i, s) in symbols.iter().enumerate() {
        assert!((s.norm() - 1.0).abs() < TOLERANCE, "symbol {} magnitude {}", i, s.norm());
        assert!(phase_of(s).is_some(), "symbol {} = {} is not a constellation point", i, s);
    }
}

#[test]
fn test_phase_is_prefix_sum_of_deltas() {
    let input = random_bits(400);
    let symbols = encode(&input).unwrap();

    let mut phase: i32 = 0;
    for (i, pair) in input.chunks_exact(2).enumerate() {
        let dibit = ((pair[0] as usize) << 1) | pair[1] as usize;
        phase = (phase + PHASE_DELTAS[dibit] as i32).rem_euclid(8);
        assert_eq!(phase_of(&symbols[i + 1]), Some(phase as usize), "symbol {}", i + 1);
    }
}

#[test]
fn test_consecutive_symbols_rotate_by_odd_multiple_of_pi_4() {
    let symbols = encode(&random_bits(256)).unwrap();
    for w in symbols.windows(2) {
        let from = phase_of(&w[0]).unwrap() as i32;
        let to = phase_of(&w[1]).unwrap() as i32;
        assert_eq!((to - from).rem_euclid(2), 1);
    }
}

#[test]
fn test_input_representations_agree() {
    let input = random_bits(128);
    let expected = encode(&input).unwrap();

    let bitarr: Vec<u8> = input.iter().map(|&b| b as u8).collect();
    assert_eq!(encode_bitarr(&bitarr).unwrap(), expected);

    // Any non-zero byte counts as a one
    let wide: Vec<u8> = input.iter().map(|&b| if b { 0xFF } else { 0 }).collect();
    assert_eq!(encode_bitarr(&wide).unwrap(), expected);

    let buf = BitBuffer::from_bools(&input);
    assert_eq!(encode_bitbuffer(&buf).unwrap(), expected);

    let modulator = Modulator;
    assert_eq!(modulator.encode(&input).unwrap(), expected);
    assert_eq!(modulator.encode_bitarr(&bitarr).unwrap(), expected);
    assert_eq!(modulator.encode_bitbuffer(&buf).unwrap(), expected);
    let mut out = Vec::new();
    assert_eq!(modulator.encode_into(&input, &mut out).unwrap(), expected.len());
    assert_eq!(out, expected);
}

#[test]
fn test_bitbuffer_position_ignored() {
    let mut buf = BitBuffer::from_bitstr("0110 1100").unwrap();
    let expected = encode(&bits("01101100")).unwrap();
    buf.read_bits(3);
    assert_eq!(encode_bitbuffer(&buf).unwrap(), expected);
    assert_eq!(buf.get_pos(), 3);
}

#[test]
fn test_packed_bytes() {
    // 0x1B = 00 01 10 11: deltas +1 +3 -1 -3, phases 1 4 3 0
    let buf = BitBuffer::from_bytes(&[0x1B]);
    let symbols = encode_bitbuffer(&buf).unwrap();
    assert_eq!(symbols, vec![IQ_TABLE[0], IQ_TABLE[1], IQ_TABLE[4], IQ_TABLE[3], IQ_TABLE[0]]);
}

#[test]
fn test_concurrent_encodes() {
    let inputs: Vec<Vec<bool>> = (0..8).map(|i| random_bits(64 * (i + 1))).collect();
    let expected: Vec<Vec<ComplexSample>> = inputs.iter().map(|b| encode(b).unwrap()).collect();

    let handles: Vec<_> = inputs
        .into_iter()
        .map(|input| thread::spawn(move || encode(&input).unwrap()))
        .collect();

    for (handle, expected) in handles.into_iter().zip(expected) {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
