//! Hamming distance and circular shifts over packed codes.
//!
//! All functions validate that their operands share one shape and that the
//! window fits the payload, then delegate the byte loop to the active kernel
//! (`simd` when the feature is enabled, table lookup otherwise).

mod shift;

pub use shift::{circular_shift, intersect_shifted_mask};

use crate::code::{BitMask, BitTemplate, ByteWindow};
use crate::kernel::{ActiveKernel, HammingKernel};
use crate::util::{HdEvalError, HdEvalResult};

/// Counts disagreeing bits of `a` and `b` inside `window`.
pub fn raw_hamming(a: &BitTemplate, b: &BitTemplate, window: ByteWindow) -> HdEvalResult<u32> {
    a.ensure_same_dims(b, "reference code")?;
    check_window(a, window)?;
    Ok(ActiveKernel::raw_count(
        window.slice(a.as_bytes()),
        window.slice(b.as_bytes()),
    ))
}

/// Counts disagreeing bits of `a` and `b` inside `window` where `mask` is set.
pub fn masked_hamming(
    a: &BitTemplate,
    b: &BitTemplate,
    mask: &BitMask,
    window: ByteWindow,
) -> HdEvalResult<u32> {
    a.ensure_same_dims(b, "reference code")?;
    a.ensure_same_dims(mask, "mask")?;
    check_window(a, window)?;
    Ok(ActiveKernel::masked_count(
        window.slice(a.as_bytes()),
        window.slice(b.as_bytes()),
        window.slice(mask.as_bytes()),
    ))
}

/// Counts valid (set) mask bits inside `window`.
pub fn valid_bits(mask: &BitMask, window: ByteWindow) -> HdEvalResult<u32> {
    check_window(mask, window)?;
    Ok(ActiveKernel::ones(window.slice(mask.as_bytes())))
}

fn check_window(code: &BitTemplate, window: ByteWindow) -> HdEvalResult<()> {
    if window.stop() > code.byte_len() {
        return Err(HdEvalError::WindowOutOfBounds {
            stop: window.stop(),
            len: code.byte_len(),
        });
    }
    Ok(())
}
