//! Rotation-tolerant scoring of a sample code against a reference.
//!
//! A sample is presented either as one code plus a range of circular shifts to
//! try, or as a list of already shifted variants (`ShiftSource`). Every
//! alignment yields a fractional Hamming distance; the algorithms differ only
//! in how they fold the best and worst alignment into a score:
//!
//! | algorithm | score                         |
//! |-----------|-------------------------------|
//! | `MinHd`   | `min`                         |
//! | `MaxHd`   | `1 - max`                     |
//! | `Ssf`     | `((1 - max) + min) / 2`       |

mod scan;

pub use scan::{fractional_distance, scan_extrema, Extrema};

use crate::code::{BitMask, BitTemplate, ByteWindow};
use crate::util::{HdEvalError, HdEvalResult};

/// Score fusion over the alignments of a comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Algorithm {
    /// Best alignment: minimum fractional distance.
    #[default]
    MinHd,
    /// Worst alignment: one minus the maximum fractional distance.
    MaxHd,
    /// Shift-score fusion of best and worst alignment.
    Ssf,
}

impl Algorithm {
    /// Folds the extrema of an alignment scan into this algorithm's score.
    pub fn fold(self, extrema: Extrema) -> f64 {
        match self {
            Algorithm::MinHd => extrema.min,
            Algorithm::MaxHd => 1.0 - extrema.max,
            Algorithm::Ssf => ((1.0 - extrema.max) + extrema.min) / 2.0,
        }
    }
}

/// Inclusive range of shift steps; step `k` rotates by `k * step` bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShiftRange {
    min: i32,
    max: i32,
    step: i32,
}

impl ShiftRange {
    /// Creates a range over steps `min..=max` of `step` bits each.
    pub fn new(min: i32, max: i32, step: i32) -> HdEvalResult<Self> {
        if min > max {
            return Err(HdEvalError::InvalidConfig {
                reason: "shift range min must not exceed max",
            });
        }
        if step == 0 {
            return Err(HdEvalError::InvalidConfig {
                reason: "shift step must be non-zero",
            });
        }
        Ok(Self { min, max, step })
    }

    /// The unshifted alignment only.
    pub fn single() -> Self {
        Self {
            min: 0,
            max: 0,
            step: 1,
        }
    }

    /// Smallest step index.
    pub fn min(&self) -> i32 {
        self.min
    }

    /// Largest step index.
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Bits per step.
    pub fn step(&self) -> i32 {
        self.step
    }

    /// Number of alignments in the range.
    pub fn len(&self) -> usize {
        (self.max as i64 - self.min as i64 + 1) as usize
    }

    /// Always false; ranges hold at least one alignment.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates the bit shifts of the range in ascending step order.
    pub fn bit_shifts(&self) -> impl Iterator<Item = i64> + '_ {
        (self.min..=self.max).map(|k| k as i64 * self.step as i64)
    }
}

impl Default for ShiftRange {
    fn default() -> Self {
        Self::single()
    }
}

/// Alignments of a sample to try against a reference.
#[derive(Clone, Copy, Debug)]
pub enum ShiftSource<'a> {
    /// One code, rotated by every shift of `range`.
    Range {
        code: &'a BitTemplate,
        mask: Option<&'a BitMask>,
        range: ShiftRange,
    },
    /// Variants shifted ahead of time, with one mask per variant if masked.
    Precomputed {
        codes: &'a [BitTemplate],
        masks: Option<&'a [BitMask]>,
    },
}

impl<'a> ShiftSource<'a> {
    /// Whether the sample carries validity masks.
    pub fn is_masked(&self) -> bool {
        match self {
            ShiftSource::Range { mask, .. } => mask.is_some(),
            ShiftSource::Precomputed { masks, .. } => masks.is_some(),
        }
    }

    /// Number of alignments tried per comparison.
    pub fn alignments(&self) -> usize {
        match self {
            ShiftSource::Range { range, .. } => range.len(),
            ShiftSource::Precomputed { codes, .. } => codes.len(),
        }
    }
}

/// Scores `source` against `reference` with `algorithm`.
///
/// The masked path is used only when both the sample and the reference carry
/// a mask; otherwise all bits in `window` count.
pub fn compare(
    algorithm: Algorithm,
    source: &ShiftSource<'_>,
    reference: &BitTemplate,
    reference_mask: Option<&BitMask>,
    window: ByteWindow,
) -> HdEvalResult<f64> {
    let extrema = scan_extrema(source, reference, reference_mask, window)?;
    Ok(algorithm.fold(extrema))
}

/// Best-alignment score.
pub fn min_hd(
    source: &ShiftSource<'_>,
    reference: &BitTemplate,
    reference_mask: Option<&BitMask>,
    window: ByteWindow,
) -> HdEvalResult<f64> {
    compare(Algorithm::MinHd, source, reference, reference_mask, window)
}

/// Worst-alignment score, `1 - max`.
pub fn max_hd(
    source: &ShiftSource<'_>,
    reference: &BitTemplate,
    reference_mask: Option<&BitMask>,
    window: ByteWindow,
) -> HdEvalResult<f64> {
    compare(Algorithm::MaxHd, source, reference, reference_mask, window)
}

/// Shift-score fusion, `((1 - max) + min) / 2`.
pub fn ssf(
    source: &ShiftSource<'_>,
    reference: &BitTemplate,
    reference_mask: Option<&BitMask>,
    window: ByteWindow,
) -> HdEvalResult<f64> {
    compare(Algorithm::Ssf, source, reference, reference_mask, window)
}
