//! Score accumulation and biometric performance curves.

pub mod histogram;
pub mod performance;
pub mod report;

pub use histogram::{ScoreHistogram, DEFAULT_BINS};
pub use performance::{
    distribution, equal_error_rate, roc_curve, DistributionRow, EqualErrorRate, RocPoint,
};
pub use report::Delimiter;
