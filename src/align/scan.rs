//! Single-pass scan over the alignments of a `ShiftSource`.

use crate::align::ShiftSource;
use crate::code::{BitMask, BitTemplate, ByteWindow};
use crate::hamming::{
    circular_shift, intersect_shifted_mask, masked_hamming, raw_hamming, valid_bits,
};
use crate::util::{HdEvalError, HdEvalResult};
use std::borrow::Cow;

/// Smallest and largest fractional Hamming distance over all alignments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extrema {
    pub min: f64,
    pub max: f64,
}

/// Fractional Hamming distance of a single alignment.
///
/// With masks, the denominator is the number of bits valid in both masks and
/// an alignment without any valid bit scores 0.
pub fn fractional_distance(
    a: &BitTemplate,
    b: &BitTemplate,
    masks: Option<(&BitMask, &BitMask)>,
    window: ByteWindow,
) -> HdEvalResult<f64> {
    match masks {
        Some((mask_a, mask_b)) => {
            let common = intersect_shifted_mask(mask_a, mask_b, 0)?;
            masked_fraction(a, b, &common, window)
        }
        None => Ok(raw_hamming(a, b, window)? as f64 / window.bit_len() as f64),
    }
}

/// Scans every alignment of `source` against `reference`.
pub fn scan_extrema(
    source: &ShiftSource<'_>,
    reference: &BitTemplate,
    reference_mask: Option<&BitMask>,
    window: ByteWindow,
) -> HdEvalResult<Extrema> {
    if let Some(mask) = reference_mask {
        reference.ensure_same_dims(mask, "reference mask")?;
    }
    if let ShiftSource::Precomputed { codes, masks } = source {
        if codes.is_empty() {
            return Err(HdEvalError::InvalidConfig {
                reason: "precomputed shift list is empty",
            });
        }
        if let Some(masks) = masks {
            if masks.len() != codes.len() {
                return Err(HdEvalError::MaskCountMismatch {
                    codes: codes.len(),
                    masks: masks.len(),
                });
            }
        }
    }

    match reference_mask.filter(|_| source.is_masked()) {
        Some(reference_mask) => scan_masked(source, reference, reference_mask, window),
        None => scan_raw(source, reference, window),
    }
}

/// Visits `(aligned code, sample mask, shift to apply to the mask)` triples.
fn for_each_alignment<F>(source: &ShiftSource<'_>, mut visit: F) -> HdEvalResult<()>
where
    F: FnMut(&BitTemplate, Option<(&BitMask, i64)>) -> HdEvalResult<()>,
{
    match *source {
        ShiftSource::Range { code, mask, range } => {
            for shift in range.bit_shifts() {
                let shifted: Cow<'_, BitTemplate> = if shift == 0 {
                    Cow::Borrowed(code)
                } else {
                    Cow::Owned(circular_shift(code, shift))
                };
                visit(&shifted, mask.map(|m| (m, shift)))?;
            }
        }
        ShiftSource::Precomputed { codes, masks } => {
            for (idx, code) in codes.iter().enumerate() {
                visit(code, masks.map(|m| (&m[idx], 0)))?;
            }
        }
    }
    Ok(())
}

fn scan_raw(
    source: &ShiftSource<'_>,
    reference: &BitTemplate,
    window: ByteWindow,
) -> HdEvalResult<Extrema> {
    let bits = window.bit_len() as u32;
    let mut min = bits;
    let mut max = 0u32;
    for_each_alignment(source, |code, _| {
        let count = raw_hamming(code, reference, window)?;
        min = min.min(count);
        max = max.max(count);
        Ok(())
    })?;
    Ok(Extrema {
        min: min as f64 / bits as f64,
        max: max as f64 / bits as f64,
    })
}

fn scan_masked(
    source: &ShiftSource<'_>,
    reference: &BitTemplate,
    reference_mask: &BitMask,
    window: ByteWindow,
) -> HdEvalResult<Extrema> {
    let mut min = 1.0f64;
    let mut max = 0.0f64;
    for_each_alignment(source, |code, mask| {
        let (sample_mask, shift) = mask.ok_or(HdEvalError::InvalidConfig {
            reason: "masked scan without a sample mask",
        })?;
        let common = intersect_shifted_mask(sample_mask, reference_mask, shift)?;
        let distance = masked_fraction(code, reference, &common, window)?;
        min = min.min(distance);
        max = max.max(distance);
        Ok(())
    })?;
    Ok(Extrema { min, max })
}

fn masked_fraction(
    a: &BitTemplate,
    b: &BitTemplate,
    common: &BitMask,
    window: ByteWindow,
) -> HdEvalResult<f64> {
    let valid = valid_bits(common, window)?;
    if valid == 0 {
        return Ok(0.0);
    }
    Ok(masked_hamming(a, b, common, window)? as f64 / valid as f64)
}
