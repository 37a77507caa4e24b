//! Plain-text export of scores, distributions, ROC curves, and EER.
//!
//! Each writer emits one record per line with fields joined by a
//! `Delimiter`. Numbers use Rust's shortest round-trip formatting, so whole
//! values print without a fraction (`0 100 0`).

use crate::stats::performance::{DistributionRow, EqualErrorRate, RocPoint};
use std::fmt::Display;
use std::io::{self, Write};

/// Field separator for text outputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Delimiter {
    #[default]
    Space,
    Semicolon,
}

impl Delimiter {
    /// The separator character.
    pub fn as_str(self) -> &'static str {
        match self {
            Delimiter::Space => " ",
            Delimiter::Semicolon => ";",
        }
    }
}

fn write_row<W: Write>(out: &mut W, delimiter: Delimiter, fields: &[&dyn Display]) -> io::Result<()> {
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            out.write_all(delimiter.as_str().as_bytes())?;
        }
        write!(out, "{field}")?;
    }
    writeln!(out)
}

/// Writes one score line, optionally prefixed by the compared identifiers.
pub fn write_score<W: Write>(
    out: &mut W,
    delimiter: Delimiter,
    labels: Option<(&str, &str)>,
    score: f64,
) -> io::Result<()> {
    match labels {
        Some((sample, reference)) => write_row(out, delimiter, &[&sample, &reference, &score]),
        None => write_row(out, delimiter, &[&score]),
    }
}

/// Writes `midpoint genuine impostor genuine% impostor%` per bin.
pub fn write_distribution<W: Write>(
    out: &mut W,
    delimiter: Delimiter,
    rows: &[DistributionRow],
) -> io::Result<()> {
    for row in rows {
        write_row(
            out,
            delimiter,
            &[
                &row.midpoint,
                &row.genuine,
                &row.impostor,
                &row.genuine_percent,
                &row.impostor_percent,
            ],
        )?;
    }
    out.flush()
}

/// Writes `fmr fnmr tmr` per ROC point.
pub fn write_roc<W: Write>(out: &mut W, delimiter: Delimiter, points: &[RocPoint]) -> io::Result<()> {
    for point in points {
        write_row(out, delimiter, &[&point.fmr, &point.fnmr, &point.tmr])?;
    }
    out.flush()
}

/// Writes `eer threshold`.
pub fn write_eer<W: Write>(out: &mut W, delimiter: Delimiter, eer: &EqualErrorRate) -> io::Result<()> {
    write_row(out, delimiter, &[&eer.percent, &eer.threshold])?;
    out.flush()
}
