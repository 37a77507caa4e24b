//! Low-level building blocks for custom comparison pipelines.
//!
//! These expose the byte kernels, bit rotation and extrema scan underneath
//! `compare` and the `Evaluator`. Most users should prefer the top-level API.

pub use crate::align::{fractional_distance, scan_extrema, Extrema};
pub use crate::hamming::{circular_shift, intersect_shifted_mask, masked_hamming, raw_hamming, valid_bits};
pub use crate::kernel::scalar::ScalarKernel;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::SimdKernel;
pub use crate::kernel::{HammingKernel, POPCOUNT};
