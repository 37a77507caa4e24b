//! Fixed-bin genuine/impostor score histograms.

use crate::util::{HdEvalError, HdEvalResult};

/// Default number of histogram bins.
pub const DEFAULT_BINS: usize = 1000;

/// Genuine and impostor score counts over `bins` equal-width bins of `[0, 1]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreHistogram {
    genuine: Vec<u64>,
    impostor: Vec<u64>,
}

impl ScoreHistogram {
    /// Creates an empty histogram with `bins` bins.
    pub fn new(bins: usize) -> HdEvalResult<Self> {
        if bins == 0 {
            return Err(HdEvalError::InvalidConfig {
                reason: "histogram needs at least one bin",
            });
        }
        Ok(Self {
            genuine: vec![0; bins],
            impostor: vec![0; bins],
        })
    }

    /// Number of bins.
    pub fn bins(&self) -> usize {
        self.genuine.len()
    }

    /// Bin index of `score`: `floor(score * bins)`, clamped into range.
    pub fn bin_of(&self, score: f64) -> usize {
        let scaled = (score * self.bins() as f64).floor();
        if scaled <= 0.0 {
            // Also catches NaN.
            return 0;
        }
        (scaled as usize).min(self.bins() - 1)
    }

    /// Records one comparison score.
    pub fn record(&mut self, score: f64, genuine: bool) {
        let idx = self.bin_of(score);
        if genuine {
            self.genuine[idx] += 1;
        } else {
            self.impostor[idx] += 1;
        }
    }

    /// Adds the counts of `other`, which must have the same bin count.
    pub fn merge(&mut self, other: &ScoreHistogram) -> HdEvalResult<()> {
        if other.bins() != self.bins() {
            return Err(HdEvalError::InvalidConfig {
                reason: "cannot merge histograms with different bin counts",
            });
        }
        for (dst, src) in self.genuine.iter_mut().zip(&other.genuine) {
            *dst += src;
        }
        for (dst, src) in self.impostor.iter_mut().zip(&other.impostor) {
            *dst += src;
        }
        Ok(())
    }

    /// Genuine counts per bin.
    pub fn genuine(&self) -> &[u64] {
        &self.genuine
    }

    /// Impostor counts per bin.
    pub fn impostor(&self) -> &[u64] {
        &self.impostor
    }

    /// Number of genuine scores recorded.
    pub fn genuine_total(&self) -> u64 {
        self.genuine.iter().sum()
    }

    /// Number of impostor scores recorded.
    pub fn impostor_total(&self) -> u64 {
        self.impostor.iter().sum()
    }
}
