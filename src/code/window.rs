//! Byte windows restricting comparisons to a bit interval.

use crate::util::{HdEvalError, HdEvalResult};

/// Half-open byte range `[start, stop)` of a packed code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteWindow {
    start: usize,
    stop: usize,
}

impl ByteWindow {
    /// Creates a window over `[start, stop)` bytes of a `byte_len` payload.
    pub fn new(start: usize, stop: usize, byte_len: usize) -> HdEvalResult<Self> {
        if stop > byte_len {
            return Err(HdEvalError::WindowOutOfBounds {
                stop,
                len: byte_len,
            });
        }
        if start >= stop {
            return Err(HdEvalError::EmptyWindow { start, stop });
        }
        Ok(Self { start, stop })
    }

    /// Covers a whole `byte_len` payload.
    pub fn full(byte_len: usize) -> HdEvalResult<Self> {
        Self::new(0, byte_len, byte_len)
    }

    /// Derives the window for the bit interval `[start_bit, stop_bit)`.
    ///
    /// Both bounds must be multiples of 8. The stop bound is clamped to the
    /// payload, so `usize::MAX`-style open intervals cover the remainder.
    pub fn from_bits(start_bit: usize, stop_bit: usize, byte_len: usize) -> HdEvalResult<Self> {
        check_aligned(start_bit)?;
        check_aligned(stop_bit)?;
        let start = start_bit / 8;
        let stop = (stop_bit / 8).min(byte_len);
        Self::new(start, stop, byte_len)
    }

    /// Derives the window for an optional bit interval.
    pub fn for_interval(bits: Option<(usize, usize)>, byte_len: usize) -> HdEvalResult<Self> {
        match bits {
            Some((start_bit, stop_bit)) => Self::from_bits(start_bit, stop_bit, byte_len),
            None => Self::full(byte_len),
        }
    }

    /// First byte (inclusive).
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last byte (exclusive).
    pub fn stop(&self) -> usize {
        self.stop
    }

    /// Number of bytes covered.
    pub fn len(&self) -> usize {
        self.stop - self.start
    }

    /// Always false; empty windows are rejected on construction.
    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }

    /// Number of bits covered.
    pub fn bit_len(&self) -> usize {
        self.len() * 8
    }

    /// Returns the window's slice of `data`.
    pub fn slice<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.start..self.stop]
    }
}

pub(crate) fn check_aligned(bit: usize) -> HdEvalResult<()> {
    if bit % 8 != 0 {
        return Err(HdEvalError::UnalignedBitIndex { bit });
    }
    Ok(())
}
