//! Rayon-parallel sweep (feature-gated).
//!
//! Samples are scored and binned in batches on the rayon pool. Each batch is
//! collected in task order; its partial histograms are merged and its scores
//! streamed on the calling thread, so the outputs match the sequential sweep.

use crate::code::CodeLoader;
use crate::eval::{Comparison, Evaluator, PathResolver, Progress, SampleTask, ScoreSink, Tally};
use crate::stats::ScoreHistogram;
use crate::util::HdEvalResult;
use rayon::prelude::*;

/// Samples scored per batch and worker thread.
const TASKS_PER_THREAD: usize = 4;

pub(super) fn sweep_par<L, R, S, P>(
    evaluator: &Evaluator<L, R>,
    tasks: &[SampleTask<'_>],
    tally: &mut Tally<'_, S, P>,
) -> HdEvalResult<()>
where
    L: CodeLoader + Sync,
    R: PathResolver + Sync,
    S: ScoreSink + ?Sized,
    P: Progress + ?Sized,
{
    let bins = evaluator.config().bins;
    let batch = rayon::current_num_threads().max(1) * TASKS_PER_THREAD;
    for chunk in tasks.chunks(batch) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|task| score_and_bin(evaluator, task, bins))
            .collect();
        for result in results {
            let (comparisons, partial) = result?;
            tally.absorb_binned(&comparisons, &partial)?;
        }
    }
    Ok(())
}

fn score_and_bin<'g, L, R>(
    evaluator: &Evaluator<L, R>,
    task: &SampleTask<'g>,
    bins: usize,
) -> HdEvalResult<(Vec<Comparison<'g>>, ScoreHistogram)>
where
    L: CodeLoader + Sync,
    R: PathResolver + Sync,
{
    let comparisons = evaluator.score_task(task)?;
    let mut partial = ScoreHistogram::new(bins)?;
    for comparison in &comparisons {
        partial.record(comparison.score, comparison.genuine);
    }
    Ok((comparisons, partial))
}
