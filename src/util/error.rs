//! Error types for hdeval.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for hdeval operations.
pub type HdEvalResult<T> = std::result::Result<T, HdEvalError>;

/// Errors that can occur while loading, comparing, or evaluating iris codes.
///
/// Every variant is fatal for a batch run; nothing is retried.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HdEvalError {
    /// A configuration value or option combination is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: &'static str },
    /// A bit index of the comparison interval is not a multiple of 8.
    #[error("bit index {bit} is not byte aligned")]
    UnalignedBitIndex { bit: usize },
    /// The comparison window contains no bytes.
    #[error("empty comparison window [{start}, {stop}) bytes")]
    EmptyWindow { start: usize, stop: usize },
    /// The comparison window extends past the end of the payload.
    #[error("window ends at byte {stop} but the code holds {len} bytes")]
    WindowOutOfBounds { stop: usize, len: usize },
    /// The input pattern matched no files.
    #[error("no input files match '{pattern}'")]
    NoInputFiles { pattern: String },
    /// A path could not be rewritten because it does not match its pattern.
    #[error("path '{path}' does not match pattern '{pattern}'")]
    PatternMismatch { pattern: String, path: String },
    /// Code dimensions are zero or overflow.
    #[error("invalid code dimensions: {width}x{height} bits")]
    InvalidDimensions { width: usize, height: usize },
    /// The payload length does not match the declared dimensions.
    #[error("payload holds {got} bytes, {needed} required")]
    BufferLengthMismatch { needed: usize, got: usize },
    /// A code or mask file could not be decoded.
    #[error("cannot decode '{}': {reason}", path.display())]
    Decode { path: PathBuf, reason: String },
    /// Two compared buffers differ in shape.
    #[error("{context} dimensions {}x{} differ from {}x{}", got.0, got.1, expected.0, expected.1)]
    DimensionMismatch {
        context: &'static str,
        expected: (usize, usize),
        got: (usize, usize),
    },
    /// A precomputed shift list carries a different number of masks than codes.
    #[error("{codes} shifted codes but {masks} masks")]
    MaskCountMismatch { codes: usize, masks: usize },
    /// An output file could not be created or written.
    #[error("cannot write '{}': {reason}", path.display())]
    OutputWrite { path: PathBuf, reason: String },
}
