//! Circular bit rotation of packed codes.
//!
//! The payload is one MSB-first circular bit stream; rows are not rotated
//! independently. Destination byte `i` is assembled from the two adjacent
//! source bytes `offset + i` and `offset + i + 1` (modulo the payload length),
//! so the same walk serves both materialized shifts and on-the-fly mask
//! intersection.

use crate::code::{BitMask, BitTemplate};
use crate::util::HdEvalResult;

/// Byte walk equivalent to rotating a `len`-byte stream by `shift_bits`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rotation {
    len: usize,
    offset: usize,
    hi: u32,
    lo: u32,
}

impl Rotation {
    /// Positive shifts rotate left, negative shifts rotate right.
    pub(crate) fn new(len: usize, shift_bits: i64) -> Self {
        debug_assert!(len > 0);
        let bits = shift_bits.unsigned_abs();
        let bytes = (bits / 8) as usize % len;
        let rem = (bits % 8) as u32;
        if shift_bits >= 0 {
            Self {
                len,
                offset: bytes,
                hi: rem,
                lo: 8 - rem,
            }
        } else {
            // Mirror of the left walk: start one byte early and swap the
            // intra-byte shift amounts.
            Self {
                len,
                offset: len - 1 - bytes,
                hi: 8 - rem,
                lo: rem,
            }
        }
    }

    /// Returns rotated byte `i` of `src`.
    #[inline]
    pub(crate) fn byte(&self, src: &[u8], i: usize) -> u8 {
        let first = (self.offset + i) % self.len;
        let second = (first + 1) % self.len;
        // Widen so that shifting by a full 8 bits clears the byte.
        let high = ((src[first] as u32) << self.hi) as u8;
        let low = ((src[second] as u32) >> self.lo) as u8;
        high | low
    }
}

/// Returns `src` rotated left by `shift_bits` (right when negative).
///
/// Rotating by a multiple of the payload length in bits is the identity.
pub fn circular_shift(src: &BitTemplate, shift_bits: i64) -> BitTemplate {
    let bytes = src.as_bytes();
    let rotation = Rotation::new(bytes.len(), shift_bits);
    let data = (0..bytes.len()).map(|i| rotation.byte(bytes, i)).collect();
    BitTemplate::from_parts_unchecked(data, src.width(), src.height())
}

/// Rotates `mask_a` by `shift_bits` and intersects it with `mask_b`.
///
/// The result marks the bits valid in both codes once the sample has been
/// aligned by the same shift; its popcount is the masked denominator.
pub fn intersect_shifted_mask(
    mask_a: &BitMask,
    mask_b: &BitMask,
    shift_bits: i64,
) -> HdEvalResult<BitMask> {
    mask_b.ensure_same_dims(mask_a, "sample mask")?;
    let a = mask_a.as_bytes();
    let rotation = Rotation::new(a.len(), shift_bits);
    let data = mask_b
        .as_bytes()
        .iter()
        .enumerate()
        .map(|(i, &b)| rotation.byte(a, i) & b)
        .collect();
    Ok(BitTemplate::from_parts_unchecked(
        data,
        mask_b.width(),
        mask_b.height(),
    ))
}
