//! Scalar reference kernel using the byte popcount table.

use crate::kernel::{HammingKernel, POPCOUNT};

/// Table-lookup kernel; one lookup per byte.
pub struct ScalarKernel;

impl HammingKernel for ScalarKernel {
    fn raw_count(a: &[u8], b: &[u8]) -> u32 {
        debug_assert_eq!(a.len(), b.len());
        a.iter()
            .zip(b)
            .map(|(&x, &y)| POPCOUNT[(x ^ y) as usize] as u32)
            .sum()
    }

    fn masked_count(a: &[u8], b: &[u8], mask: &[u8]) -> u32 {
        debug_assert_eq!(a.len(), b.len());
        debug_assert_eq!(a.len(), mask.len());
        a.iter()
            .zip(b)
            .zip(mask)
            .map(|((&x, &y), &m)| POPCOUNT[((x ^ y) & m) as usize] as u32)
            .sum()
    }

    fn ones(a: &[u8]) -> u32 {
        a.iter().map(|&x| POPCOUNT[x as usize] as u32).sum()
    }
}
