//! Packed-bit iris codes and masks.
//!
//! A `BitTemplate` stores `width * height` bits packed MSB-first into
//! `ceil(width * height / 8)` bytes. The payload length is fixed when the code
//! is created; every operation that combines two codes checks that their
//! dimensions agree.

use crate::util::{HdEvalError, HdEvalResult};
use std::path::Path;

#[cfg(feature = "image-io")]
pub mod io;
mod window;

pub(crate) use window::check_aligned;
pub use window::ByteWindow;

/// Immutable packed-bit iris code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitTemplate {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

/// Validity mask for a `BitTemplate`; a set bit marks a usable position.
pub type BitMask = BitTemplate;

impl BitTemplate {
    /// Wraps a packed payload of `width * height` bits.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> HdEvalResult<Self> {
        let needed = packed_len(width, height)?;
        if data.len() != needed {
            return Err(HdEvalError::BufferLengthMismatch {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wraps `rows` of packed bytes, `row_bytes` bytes (8 bits each) per row.
    pub fn from_rows(data: Vec<u8>, row_bytes: usize, rows: usize) -> HdEvalResult<Self> {
        let width = row_bytes
            .checked_mul(8)
            .ok_or(HdEvalError::InvalidDimensions {
                width: row_bytes,
                height: rows,
            })?;
        Self::new(data, width, rows)
    }

    /// Creates a code of the given shape with every bit set.
    pub fn filled(width: usize, height: usize) -> HdEvalResult<Self> {
        let len = packed_len(width, height)?;
        Self::new(vec![0xFF; len], width, height)
    }

    /// Returns the width in bits.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height in rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns the payload length in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Returns the packed payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns bit `index` of the MSB-first bit stream.
    pub fn bit(&self, index: usize) -> Option<bool> {
        let byte = self.data.get(index / 8)?;
        Some(byte & (0x80 >> (index % 8)) != 0)
    }

    /// Returns a code of the same shape with every bit inverted.
    pub fn complement(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|b| !b).collect(),
        }
    }

    /// Fails with `DimensionMismatch` unless `other` has the same shape.
    pub fn ensure_same_dims(&self, other: &BitTemplate, context: &'static str) -> HdEvalResult<()> {
        if self.dims() != other.dims() {
            return Err(HdEvalError::DimensionMismatch {
                context,
                expected: self.dims(),
                got: other.dims(),
            });
        }
        Ok(())
    }

    pub(crate) fn from_parts_unchecked(data: Vec<u8>, width: usize, height: usize) -> Self {
        debug_assert_eq!(packed_len(width, height).ok(), Some(data.len()));
        Self {
            width,
            height,
            data,
        }
    }
}

/// Source of decoded codes and masks.
///
/// Implementations must fail with `HdEvalError::Decode` for unreadable, empty,
/// or wrongly encoded inputs instead of returning partial buffers.
pub trait CodeLoader {
    /// Decodes the code stored at `path`.
    fn load(&self, path: &Path) -> HdEvalResult<BitTemplate>;
}

impl<L: CodeLoader + ?Sized> CodeLoader for &L {
    fn load(&self, path: &Path) -> HdEvalResult<BitTemplate> {
        (**self).load(path)
    }
}

fn packed_len(width: usize, height: usize) -> HdEvalResult<usize> {
    if width == 0 || height == 0 {
        return Err(HdEvalError::InvalidDimensions { width, height });
    }
    let bits = width
        .checked_mul(height)
        .ok_or(HdEvalError::InvalidDimensions { width, height })?;
    Ok(bits.div_ceil(8))
}
