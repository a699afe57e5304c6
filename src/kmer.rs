//! Two-bit packed k-mers over the {A, C, T, G} alphabet.
//!
//! Four bases are stored per byte, least-significant pair first, so the
//! packing order within the backing buffer looks like this:
//!
//! ```text
//! index: 0 1 2 3 | 4 5 6 7 | 8 ...
//! byte:  0       | 1       | 2
//! bits:  1:0 3:2 5:4 7:6 | ...
//! ```
//!
//! The buffer is sized once at construction. Unused bits are always zero,
//! which lets equality and hashing work on the used bytes directly.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{AssemblyError, Result};
use crate::unit::SequenceUnit;

const BASES_PER_BYTE: usize = 4;

/// A single nucleotide and its 2-bit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base {
    A = 0,
    C = 1,
    T = 2,
    G = 3,
}

impl Base {
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decode the low two bits of `code`.
    #[inline]
    pub fn from_code(code: u8) -> Self {
        match code & 0b11 {
            0 => Self::A,
            1 => Self::C,
            2 => Self::T,
            _ => Self::G,
        }
    }

    /// Upper-case `A`, `C`, `T` or `G`; anything else is `None`.
    #[inline]
    pub fn from_ascii(symbol: u8) -> Option<Self> {
        match symbol {
            b'A' => Some(Self::A),
            b'C' => Some(Self::C),
            b'T' => Some(Self::T),
            b'G' => Some(Self::G),
            _ => None,
        }
    }

    #[inline]
    pub fn to_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::C => 'C',
            Self::T => 'T',
            Self::G => 'G',
        }
    }
}

/// Fixed-capacity, bit-packed nucleotide sequence.
#[derive(Debug, Clone)]
pub struct PackedKmer {
    buffer: Box<[u8]>,
    len: usize,
}

impl PackedKmer {
    /// Allocate room for at least `k` bases (`ceil(k / 4)` bytes).
    pub fn with_capacity(k: usize) -> Self {
        Self {
            buffer: vec![0u8; k.div_ceil(BASES_PER_BYTE)].into_boxed_slice(),
            len: 0,
        }
    }

    /// Encode `text`, silently skipping every character outside `ACTG`.
    ///
    /// No case folding is applied: lower-case bases are skipped too.
    pub fn encode(text: &str) -> Self {
        let mut kmer = Self::with_capacity(text.len());
        for base in text.bytes().filter_map(Base::from_ascii) {
            kmer.push_unchecked(base);
        }
        kmer
    }

    /// Encode `text`, rejecting the first character outside `ACTG`.
    pub fn encode_strict(text: &str) -> Result<Self> {
        let mut kmer = Self::with_capacity(text.len());
        for (position, symbol) in text.chars().enumerate() {
            let base = u8::try_from(symbol)
                .ok()
                .and_then(Base::from_ascii)
                .ok_or(AssemblyError::InvalidSymbol { symbol, position })?;
            kmer.push_unchecked(base);
        }
        Ok(kmer)
    }

    /// Append one base, failing once the construction-time buffer is full.
    pub fn append(&mut self, base: Base) -> Result<()> {
        if self.len >= self.capacity() {
            return Err(AssemblyError::CapacityExceeded {
                capacity: self.capacity(),
            });
        }
        self.push_unchecked(base);
        Ok(())
    }

    // Callers guarantee `len < capacity`.
    fn push_unchecked(&mut self, base: Base) {
        let shift = (self.len % BASES_PER_BYTE) * 2;
        self.buffer[self.len / BASES_PER_BYTE] |= base.code() << shift;
        self.len += 1;
    }

    /// Base at `offset`.
    pub fn get(&self, offset: usize) -> Result<Base> {
        if offset >= self.len {
            return Err(AssemblyError::OutOfRange {
                offset,
                len: self.len,
            });
        }
        Ok(self.base_at(offset))
    }

    #[inline]
    fn base_at(&self, offset: usize) -> Base {
        let shift = (offset % BASES_PER_BYTE) * 2;
        Base::from_code(self.buffer[offset / BASES_PER_BYTE] >> shift)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of bases the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.buffer.len() * BASES_PER_BYTE
    }

    /// Decoded bases, in order.
    pub fn bases(&self) -> impl Iterator<Item = Base> + '_ {
        (0..self.len).map(move |offset| self.base_at(offset))
    }

    /// Bytes that hold at least one base.
    fn used_bytes(&self) -> &[u8] {
        &self.buffer[..self.len.div_ceil(BASES_PER_BYTE)]
    }

    fn copy_range(&self, start: usize, end: usize) -> Self {
        let mut out = Self::with_capacity(end - start);
        for offset in start..end {
            out.push_unchecked(self.base_at(offset));
        }
        out
    }
}

impl SequenceUnit for PackedKmer {
    fn prefix(&self) -> Self {
        self.copy_range(0, self.len.saturating_sub(1))
    }

    fn suffix(&self) -> Self {
        self.copy_range(self.len.min(1), self.len)
    }

    fn size(&self) -> usize {
        self.len
    }
}

impl PartialEq for PackedKmer {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.bases().eq(other.bases())
    }
}

impl Eq for PackedKmer {}

impl Hash for PackedKmer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        self.used_bytes().hash(state);
    }
}

impl fmt::Display for PackedKmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = String::with_capacity(self.len);
        text.extend(self.bases().map(Base::to_char));
        f.write_str(&text)
    }
}

impl FromStr for PackedKmer {
    type Err = AssemblyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::encode_strict(s)
    }
}
