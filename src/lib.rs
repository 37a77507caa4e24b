//! hdeval is an offline evaluator for binary iris codes.
//!
//! It scores pairs of packed-bit templates with a rotation-tolerant masked
//! Hamming distance, accumulates genuine and impostor score histograms over a
//! corpus, and derives distribution tables, ROC curves and the equal error
//! rate. Parallel sweeps are available via the `rayon` feature, SIMD kernels
//! via `simd`, and an image codec for code files via `image-io`.

pub mod align;
pub mod code;
pub mod eval;
pub mod hamming;
mod kernel;
pub mod stats;
mod trace;
pub mod util;

pub mod lowlevel;

pub use align::{compare, Algorithm, ShiftRange, ShiftSource};
pub use code::{BitMask, BitTemplate, ByteWindow, CodeLoader};
pub use eval::{
    Comparison, EnumerationPolicy, EvalConfig, Evaluator, MaskRules, NoProgress, NullSink,
    PathResolver, Progress, ScoreSink, ShiftMode, UserTemplateGroup,
};
pub use stats::{
    distribution, equal_error_rate, roc_curve, DistributionRow, EqualErrorRate, RocPoint,
    ScoreHistogram,
};
pub use util::{HdEvalError, HdEvalResult};
