use std::{cmp::max, fmt};

use crate::bit_parse_error::BitParseErr;

/// MSB-first bit container used to hand bursts to the modulator.
pub struct BitBuffer {
    buffer: Vec<u8>,
    pos: usize,         // next bit offset for read/write
    end: usize,         // number of valid bits
    flag_autoexpand: bool,   // if true, ignores end pointer on writes and reallocates buffer if insufficient capacity
}

impl BitBuffer {
    /// Create a zeroed buffer capable of holding exactly `len_bits` bits.
    pub fn new(len_bits: usize) -> Self {
        let byte_len = len_bits.div_ceil(8);
        BitBuffer {
            buffer: vec![0; byte_len],
            pos: 0,
            end: len_bits,
            flag_autoexpand: false,
        }
    }

    /// Create a zeroed buffer with an inital capacity but zero length (end is set to 0).
    /// Writes to this buffer will automatically advance the end pointer and reallocate the buffer if needed
    pub fn new_autoexpand(initial_max_len_bits: usize) -> Self {
        let byte_len = initial_max_len_bits.div_ceil(8);
        BitBuffer {
            buffer: vec![0; byte_len],
            pos: 0,
            end: 0,
            flag_autoexpand: true,
        }
    }

    /// Wrap an existing byte-vector as a BitBuffer (all bits readable).
    /// No new allocation is needed here.
    pub fn from_vec(data: Vec<u8>) -> Self {
        let len_bits = data.len() * 8;
        BitBuffer {
            buffer: data,
            pos: 0,
            end: len_bits,
            flag_autoexpand: false,
        }
    }

    /// Packed bytes, first bit is the MSB of the first byte.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::from_vec(data.to_vec())
    }

    /// Construct a BitBuffer from a string of '0'/'1' characters.
    /// Whitespace and '_' are accepted as visual separators and skipped.
    /// Any other character yields BitParseErr::InvalidChar, `pos` being its char index (not byte offset).
    pub fn from_bitstr(bitstr: &str) -> Result<Self, BitParseErr> {
        let mut buf = BitBuffer::new_autoexpand(bitstr.len());
        for (pos, c) in bitstr.chars().enumerate() {
            match c {
                '0' => buf.write_bit(0),
                '1' => buf.write_bit(1),
                c if c.is_whitespace() || c == '_' => {}
                found => return Err(BitParseErr::InvalidChar { pos, found }),
            }
        }
        // reset pos for reading
        buf.pos = 0;
        Ok(buf)
    }

    /// Construct a BitBuffer from a slice of booleans.
    pub fn from_bools(data: &[bool]) -> Self {
        let mut buf = BitBuffer::new(data.len());
        for &bit in data {
            buf.write_bit(bit as u8);
        }
        buf.pos = 0;
        buf
    }

    /// Convert all bits into a String of '0'/'1' characters.
    pub fn to_bitstr(&self) -> String {
        self.iter_bits().map(|b| if b { '1' } else { '0' }).collect()
    }

    /// Iterate over all bits, independent of pos.
    pub fn iter_bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.end).map(move |i| self.read_bit_at_unchecked(i) != 0)
    }

    /// Peek `num_bits` at the current pos, without advancing.
    /// Returns None on overflow or if `num_bits>64`.
    pub fn peek_bits(&self, num_bits: usize) -> Option<u64> {
        if num_bits > 64 || self.pos + num_bits > self.end {
            return None;
        }
        Some(self.read_bits_at_unchecked(self.pos, num_bits))
    }

    /// Read `num_bits` at the current pos, advancing on success.
    pub fn read_bits(&mut self, num_bits: usize) -> Option<u64> {
        let v = self.peek_bits(num_bits)?;
        self.pos += num_bits;
        Some(v)
    }

    /// When a write would exceed the end, but the BitBuffer is set to automatically expand,
    /// this function is called to increase `end` and if needed, allocate more space in the buffer.
    fn move_end(&mut self, needed_extra_bits: usize) {
        let free_cap_bits = self.buffer.len() * 8 - self.end;
        let needed_total_bits = self.end + needed_extra_bits;

        if needed_extra_bits > free_cap_bits {
            let double_cap_bits = self.buffer.len() * 8 * 2;
            let new_cap_bits = max(needed_total_bits, double_cap_bits);
            self.buffer.resize(new_cap_bits.div_ceil(8), 0);
        }

        self.end += needed_extra_bits;
    }

    /// Write a single bit to pos
    pub fn write_bit(&mut self, value: u8) {
        assert!(value == 0 || value == 1, "write_bit: value must be 0 or 1");
        if self.pos + 1 > self.end {
            assert!(self.flag_autoexpand, "write_bit would exceed buffer end");
            self.move_end(1);
        }

        let index = self.pos / 8;
        let shift = 7 - (self.pos % 8);
        self.buffer[index] &= !(1 << shift);
        self.buffer[index] |= value << shift;
        self.pos += 1;
    }

    /// Length in bits
    pub fn get_len(&self) -> usize {
        self.end
    }

    /// Current read/write position in bits
    pub fn get_pos(&self) -> usize {
        self.pos
    }

    /// Dump all bits as a binary string of '0'/'1'.
    /// Adds a ^ marker before the current pos.
    pub fn dump_bin(&self) -> String {
        let mut s = String::with_capacity(self.get_len() + 1);
        for i in 0..self.end {
            if i == self.pos { s.push('^'); }
            s.push(if self.read_bit_at_unchecked(i) != 0 { '1' } else { '0' });
        }
        if self.pos == self.end { s.push('^'); }
        s
    }

    /// Reads exactly `num_bits` bits starting at `bit_pos`, MSB first.
    /// **Caller must ensure** `num_bits <= 64` and `bit_pos + num_bits <= end`.
    fn read_bits_at_unchecked(&self, bit_pos: usize, num_bits: usize) -> u64 {
        (bit_pos..bit_pos + num_bits)
            .fold(0u64, |acc, i| (acc << 1) | self.read_bit_at_unchecked(i) as u64)
    }

    /// Reads 1 bit at `bit_pos`.
    /// **Caller must ensure** `bit_pos < end`.
    fn read_bit_at_unchecked(&self, bit_pos: usize) -> u8 {
        (self.buffer[bit_pos / 8] >> (7 - (bit_pos % 8))) & 1
    }
}

impl fmt::Debug for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitBuffer {{ ^{} >{} {} }}", self.pos, self.end, self.dump_bin())
    }
}
