//! SIMD-accelerated kernel using the `wide` crate.
//!
//! XOR and AND run 16 bytes at a time in `u8x16`; the popcount of each lane
//! still goes through the byte table. Tails shorter than a vector fall back to
//! the scalar kernel.

use crate::kernel::scalar::ScalarKernel;
use crate::kernel::{HammingKernel, POPCOUNT};
use wide::u8x16;

const LANES: usize = 16;

#[inline]
fn load(slice: &[u8]) -> u8x16 {
    let mut lanes = [0u8; LANES];
    lanes.copy_from_slice(&slice[..LANES]);
    u8x16::from(lanes)
}

#[inline]
fn lane_popcount(v: u8x16) -> u32 {
    v.to_array().iter().map(|&x| POPCOUNT[x as usize] as u32).sum()
}

/// Vectorized kernel.
pub struct SimdKernel;

impl HammingKernel for SimdKernel {
    fn raw_count(a: &[u8], b: &[u8]) -> u32 {
        debug_assert_eq!(a.len(), b.len());
        let simd_end = a.len() / LANES * LANES;
        let mut count = 0u32;
        let mut i = 0;
        while i < simd_end {
            count += lane_popcount(load(&a[i..]) ^ load(&b[i..]));
            i += LANES;
        }
        count + ScalarKernel::raw_count(&a[simd_end..], &b[simd_end..])
    }

    fn masked_count(a: &[u8], b: &[u8], mask: &[u8]) -> u32 {
        debug_assert_eq!(a.len(), b.len());
        debug_assert_eq!(a.len(), mask.len());
        let simd_end = a.len() / LANES * LANES;
        let mut count = 0u32;
        let mut i = 0;
        while i < simd_end {
            let diff = (load(&a[i..]) ^ load(&b[i..])) & load(&mask[i..]);
            count += lane_popcount(diff);
            i += LANES;
        }
        count
            + ScalarKernel::masked_count(&a[simd_end..], &b[simd_end..], &mask[simd_end..])
    }

    fn ones(a: &[u8]) -> u32 {
        ScalarKernel::ones(a)
    }
}
