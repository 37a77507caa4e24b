//! Threshold sweeps over score histograms: distributions, ROC, and EER.
//!
//! Lower scores mean more similar codes, so a threshold at the upper edge of
//! bin `i` accepts every score in bins `0..=i`. Impostors accepted there are
//! false matches; genuines in later bins are false non-matches.

use crate::stats::histogram::ScoreHistogram;
use crate::util::math::{crossing_point, ratio};

/// One row of the score distribution export.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistributionRow {
    /// Bin center in score units.
    pub midpoint: f64,
    pub genuine: u64,
    pub impostor: u64,
    /// Share of all genuine scores in this bin, in percent.
    pub genuine_percent: f64,
    /// Share of all impostor scores in this bin, in percent.
    pub impostor_percent: f64,
}

/// One operating point of the ROC curve, all rates in percent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RocPoint {
    pub fmr: f64,
    pub fnmr: f64,
    pub tmr: f64,
}

impl RocPoint {
    /// The point every curve starts from: nothing accepted.
    pub const ORIGIN: RocPoint = RocPoint {
        fmr: 0.0,
        fnmr: 100.0,
        tmr: 0.0,
    };
}

/// Equal error rate and the threshold at which it was found.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EqualErrorRate {
    /// Error rate in percent.
    pub percent: f64,
    /// Upper score edge of the bin where the rates cross.
    pub threshold: f64,
    /// Bin index where the rates cross.
    pub bin: usize,
}

/// Cumulative error counts after bin `bin`.
#[derive(Clone, Copy, Debug)]
struct SweepStep {
    bin: usize,
    false_accepts: u64,
    false_rejects: u64,
}

/// Yields the sweep states at which either error count changes.
fn sweep(hist: &ScoreHistogram) -> impl Iterator<Item = SweepStep> + '_ {
    let mut false_accepts = 0u64;
    let mut false_rejects = hist.genuine_total();
    hist.genuine()
        .iter()
        .zip(hist.impostor())
        .enumerate()
        .filter_map(move |(bin, (&genuine, &impostor))| {
            false_accepts += impostor;
            false_rejects -= genuine;
            (genuine != 0 || impostor != 0).then_some(SweepStep {
                bin,
                false_accepts,
                false_rejects,
            })
        })
}

/// Exports per-bin counts and shares of both populations.
pub fn distribution(hist: &ScoreHistogram) -> Vec<DistributionRow> {
    let bins = hist.bins();
    let genuine_total = hist.genuine_total();
    let impostor_total = hist.impostor_total();
    hist.genuine()
        .iter()
        .zip(hist.impostor())
        .enumerate()
        .map(|(i, (&genuine, &impostor))| DistributionRow {
            midpoint: (i as f64 + 0.5) / bins as f64,
            genuine,
            impostor,
            genuine_percent: 100.0 * ratio(genuine, genuine_total),
            impostor_percent: 100.0 * ratio(impostor, impostor_total),
        })
        .collect()
}

/// Computes the ROC curve, starting with `RocPoint::ORIGIN`.
///
/// A point is emitted only for thresholds where the false-accept or
/// false-reject count changes.
pub fn roc_curve(hist: &ScoreHistogram) -> Vec<RocPoint> {
    let genuine_total = hist.genuine_total();
    let impostor_total = hist.impostor_total();
    let mut points = vec![RocPoint::ORIGIN];
    points.extend(sweep(hist).map(|step| {
        let fmr = 100.0 * ratio(step.false_accepts, impostor_total);
        let fnmr = 100.0 * ratio(step.false_rejects, genuine_total);
        RocPoint {
            fmr,
            fnmr,
            tmr: 100.0 - fnmr,
        }
    }));
    points
}

/// Locates the equal error rate.
///
/// At the first swept bin where the false match rate reaches the false
/// non-match rate, equal rates are reported as is; otherwise the crossing is
/// linearly interpolated from the previous swept bin. Returns `None` when
/// either population is empty or the rates never meet.
pub fn equal_error_rate(hist: &ScoreHistogram) -> Option<EqualErrorRate> {
    let genuine_total = hist.genuine_total();
    let impostor_total = hist.impostor_total();
    if genuine_total == 0 || impostor_total == 0 {
        return None;
    }
    let bins = hist.bins() as f64;
    let mut last_fmr = 0.0;
    let mut last_fnmr = 1.0;
    for step in sweep(hist) {
        let fmr = ratio(step.false_accepts, impostor_total);
        let fnmr = ratio(step.false_rejects, genuine_total);
        let rate = if fmr == fnmr {
            Some(fmr)
        } else if fmr > fnmr {
            Some(crossing_point(last_fmr, last_fnmr, fmr, fnmr))
        } else {
            None
        };
        if let Some(rate) = rate {
            return Some(EqualErrorRate {
                percent: 100.0 * rate,
                threshold: (step.bin as f64 + 1.0) / bins,
                bin: step.bin,
            });
        }
        last_fmr = fmr;
        last_fnmr = fnmr;
    }
    None
}
