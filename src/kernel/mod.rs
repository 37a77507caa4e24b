//! Byte-slice Hamming kernels.
//!
//! Kernels operate on pre-windowed, equal-length byte slices; shape and window
//! validation happens in `crate::hamming`.

/// Population count of every byte value.
pub const POPCOUNT: [u8; 256] = build_popcount();

const fn build_popcount() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut value = 1usize;
    while value < 256 {
        table[value] = table[value >> 1] + (value & 1) as u8;
        value += 1;
    }
    table
}

/// Kernel trait for disagreement counting.
pub trait HammingKernel {
    /// Counts differing bits of `a` and `b`.
    fn raw_count(a: &[u8], b: &[u8]) -> u32;

    /// Counts differing bits of `a` and `b` where `mask` is set.
    fn masked_count(a: &[u8], b: &[u8], mask: &[u8]) -> u32;

    /// Counts set bits of `a`.
    fn ones(a: &[u8]) -> u32;
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(not(feature = "simd"))]
pub(crate) use scalar::ScalarKernel as ActiveKernel;
#[cfg(feature = "simd")]
pub(crate) use simd::SimdKernel as ActiveKernel;

#[cfg(test)]
mod tests {
    use super::POPCOUNT;

    #[test]
    fn popcount_table_matches_count_ones() {
        for (value, &count) in POPCOUNT.iter().enumerate() {
            assert_eq!(count as u32, (value as u8).count_ones());
        }
    }
}
