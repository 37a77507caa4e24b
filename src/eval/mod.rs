//! Batch evaluation of a template corpus.
//!
//! An `Evaluator` walks the comparisons an `EnumerationPolicy` selects from a
//! `UserTemplateGroup`, decodes each sample once, scores it against its
//! references and accumulates the scores into a `ScoreHistogram`. Decoding and
//! path handling go through the `CodeLoader` and `PathResolver` collaborators;
//! every score is also handed to a `ScoreSink` in enumeration order.

mod groups;
pub mod pattern;
mod plan;
#[cfg(feature = "rayon")]
mod rayon;
mod sample;

pub use groups::UserTemplateGroup;
pub use pattern::WildcardPattern;
pub use plan::{enumerate_pairs, planned_counts, EnumerationPolicy, PairCounts, Reference, SampleTask};

use crate::align::{compare, Algorithm, ShiftRange};
use crate::code::{check_aligned, CodeLoader};
use crate::stats::{ScoreHistogram, DEFAULT_BINS};
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::{HdEvalError, HdEvalResult};
use sample::SampleLoader;
use std::path::{Path, PathBuf};

/// How the alignments of a sample are obtained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShiftMode {
    /// Rotate the sample code over a range of shifts.
    Range(ShiftRange),
    /// Load shifted variants located by rewriting the sample path with `rule`.
    ///
    /// The rewritten path is itself a wildcard pattern; every file it matches
    /// is one variant.
    Precomputed { rule: String },
}

impl Default for ShiftMode {
    fn default() -> Self {
        ShiftMode::Range(ShiftRange::single())
    }
}

/// Rename rules locating the validity mask of a template.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaskRules {
    /// Rule applied to samples (and, rewritten again, to their variants).
    pub sample: String,
    /// Rule applied to references; falls back to `sample`.
    pub reference: Option<String>,
}

impl MaskRules {
    /// One rule for samples and references alike.
    pub fn shared(rule: impl Into<String>) -> Self {
        Self {
            sample: rule.into(),
            reference: None,
        }
    }

    /// The rule used for references.
    pub fn reference_rule(&self) -> &str {
        self.reference.as_deref().unwrap_or(&self.sample)
    }
}

/// Settings of an evaluation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Wildcard pattern the templates were expanded from; rename rules refer
    /// to its captures.
    pub input_pattern: String,
    pub algorithm: Algorithm,
    pub policy: EnumerationPolicy,
    pub shifts: ShiftMode,
    /// Optional validity masks; without them every bit is compared.
    pub masks: Option<MaskRules>,
    /// Bit interval `[start, stop)` to compare, both multiples of 8.
    pub bits: Option<(usize, usize)>,
    /// Histogram resolution.
    pub bins: usize,
    /// Score samples on the rayon pool (feature `rayon`).
    pub parallel: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            input_pattern: String::new(),
            algorithm: Algorithm::default(),
            policy: EnumerationPolicy::default(),
            shifts: ShiftMode::default(),
            masks: None,
            bits: None,
            bins: DEFAULT_BINS,
            parallel: false,
        }
    }
}

impl EvalConfig {
    /// Creates the default configuration for templates matching `input_pattern`.
    pub fn new(input_pattern: impl Into<String>) -> Self {
        Self {
            input_pattern: input_pattern.into(),
            ..Self::default()
        }
    }

    /// Checks the settings that do not depend on the decoded codes.
    pub fn validate(&self) -> HdEvalResult<()> {
        if self.bins == 0 {
            return Err(HdEvalError::InvalidConfig {
                reason: "bins must be at least 1",
            });
        }
        if let Some((start, stop)) = self.bits {
            check_aligned(start)?;
            check_aligned(stop)?;
            if start >= stop {
                return Err(HdEvalError::EmptyWindow {
                    start: start / 8,
                    stop: stop / 8,
                });
            }
        }
        if let ShiftMode::Precomputed { rule } = &self.shifts {
            if rule.is_empty() {
                return Err(HdEvalError::InvalidConfig {
                    reason: "shifted template rule must not be empty",
                });
            }
        }
        if let Some(masks) = &self.masks {
            if masks.sample.is_empty() || masks.reference_rule().is_empty() {
                return Err(HdEvalError::InvalidConfig {
                    reason: "mask rules must not be empty",
                });
            }
        }
        if self.parallel && cfg!(not(feature = "rayon")) {
            return Err(HdEvalError::InvalidConfig {
                reason: "parallel evaluation requires the `rayon` feature",
            });
        }
        Ok(())
    }
}

/// Locates files for an evaluation run.
pub trait PathResolver {
    /// Lists the existing files matching `pattern`, sorted.
    fn expand(&self, pattern: &str) -> HdEvalResult<Vec<PathBuf>>;

    /// Rewrites `path`, which matched `pattern`, through `rule`.
    ///
    /// `{marker}n` in `rule` stands for the n-th wildcard capture.
    fn rename(&self, pattern: &str, path: &Path, rule: &str, marker: char) -> HdEvalResult<String> {
        WildcardPattern::new(pattern).rename(&path.to_string_lossy(), rule, marker)
    }
}

impl<R: PathResolver + ?Sized> PathResolver for &R {
    fn expand(&self, pattern: &str) -> HdEvalResult<Vec<PathBuf>> {
        (**self).expand(pattern)
    }

    fn rename(&self, pattern: &str, path: &Path, rule: &str, marker: char) -> HdEvalResult<String> {
        (**self).rename(pattern, path, rule, marker)
    }
}

/// Observer of run progress, counted in comparisons.
pub trait Progress {
    /// Called once before the first comparison with the planned total.
    fn start(&mut self, _total: u64) {}
    /// Called after each sample with the number of comparisons done so far.
    fn advance(&mut self, _done: u64) {}
    /// Called once after the last comparison.
    fn finish(&mut self) {}
}

/// Progress observer that ignores every update.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl Progress for NoProgress {}

impl<P: Progress + ?Sized> Progress for &mut P {
    fn start(&mut self, total: u64) {
        (**self).start(total)
    }

    fn advance(&mut self, done: u64) {
        (**self).advance(done)
    }

    fn finish(&mut self) {
        (**self).finish()
    }
}

/// One scored pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Comparison<'g> {
    pub sample: &'g Path,
    pub reference: &'g Path,
    pub score: f64,
    pub genuine: bool,
}

/// Receiver of individual scores, called in enumeration order.
pub trait ScoreSink {
    fn accept(&mut self, comparison: &Comparison<'_>) -> HdEvalResult<()>;
}

/// Sink that discards every score.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ScoreSink for NullSink {
    fn accept(&mut self, _comparison: &Comparison<'_>) -> HdEvalResult<()> {
        Ok(())
    }
}

impl<S: ScoreSink + ?Sized> ScoreSink for &mut S {
    fn accept(&mut self, comparison: &Comparison<'_>) -> HdEvalResult<()> {
        (**self).accept(comparison)
    }
}

/// Folds scored samples into the histogram, sink and progress in order.
struct Tally<'s, S: ?Sized, P: ?Sized> {
    histogram: ScoreHistogram,
    sink: &'s mut S,
    progress: &'s mut P,
    done: u64,
}

impl<'s, S, P> Tally<'s, S, P>
where
    S: ScoreSink + ?Sized,
    P: Progress + ?Sized,
{
    fn absorb(&mut self, comparisons: &[Comparison<'_>]) -> HdEvalResult<()> {
        for comparison in comparisons {
            self.histogram.record(comparison.score, comparison.genuine);
        }
        self.stream(comparisons)
    }

    /// Adds a histogram binned elsewhere, then streams its comparisons.
    #[cfg_attr(not(feature = "rayon"), allow(dead_code))]
    fn absorb_binned(
        &mut self,
        comparisons: &[Comparison<'_>],
        partial: &ScoreHistogram,
    ) -> HdEvalResult<()> {
        self.histogram.merge(partial)?;
        self.stream(comparisons)
    }

    fn stream(&mut self, comparisons: &[Comparison<'_>]) -> HdEvalResult<()> {
        for comparison in comparisons {
            self.sink.accept(comparison)?;
        }
        self.done += comparisons.len() as u64;
        self.progress.advance(self.done);
        Ok(())
    }
}

/// Runs the comparisons of a template corpus.
///
/// The loader and resolver are shared across rayon workers when parallel
/// evaluation is enabled, hence the `Sync` bounds.
#[derive(Debug)]
pub struct Evaluator<L, R> {
    config: EvalConfig,
    loader: L,
    resolver: R,
}

impl<L, R> Evaluator<L, R>
where
    L: CodeLoader + Sync,
    R: PathResolver + Sync,
{
    /// Validates `config` and binds the collaborators.
    pub fn new(config: EvalConfig, loader: L, resolver: R) -> HdEvalResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            loader,
            resolver,
        })
    }

    /// The run configuration.
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Groups the files matching the input pattern by `class_rule`.
    pub fn discover(&self, class_rule: &str) -> HdEvalResult<UserTemplateGroup> {
        UserTemplateGroup::discover(&self.resolver, &self.config.input_pattern, class_rule)
    }

    /// Scores every comparison of `group` and returns the score histogram.
    ///
    /// Scores reach `sink` in enumeration order whether or not the sweep runs
    /// in parallel. The first decode or shape error aborts the run.
    pub fn run<S, P>(
        &self,
        group: &UserTemplateGroup,
        sink: &mut S,
        progress: &mut P,
    ) -> HdEvalResult<ScoreHistogram>
    where
        S: ScoreSink + ?Sized,
        P: Progress + ?Sized,
    {
        let counts = planned_counts(group, self.config.policy);
        trace_event!(
            "organizing_matches",
            users = group.user_count(),
            templates = group.template_count(),
            genuine = counts.genuine,
            impostor = counts.impostor
        );
        let tasks = enumerate_pairs(group, self.config.policy);
        let _span = trace_span!(
            "evaluate",
            samples = tasks.len(),
            comparisons = counts.total(),
            parallel = self.config.parallel
        )
        .entered();

        progress.start(counts.total());
        let mut tally = Tally {
            histogram: ScoreHistogram::new(self.config.bins)?,
            sink,
            progress,
            done: 0,
        };

        #[cfg(feature = "rayon")]
        {
            if self.config.parallel {
                self::rayon::sweep_par(self, &tasks, &mut tally)?;
                return Ok(finish(tally, counts));
            }
        }

        for task in &tasks {
            let comparisons = self.score_task(task)?;
            tally.absorb(&comparisons)?;
        }
        Ok(finish(tally, counts))
    }

    /// Decodes the sample of `task` and scores it against each reference.
    fn score_task<'g>(&self, task: &SampleTask<'g>) -> HdEvalResult<Vec<Comparison<'g>>> {
        let loader = SampleLoader {
            config: &self.config,
            loader: &self.loader,
            resolver: &self.resolver,
        };
        let sample = loader.load_sample(task.sample)?;
        let source = sample.source();
        let window = sample.window();

        let mut comparisons = Vec::with_capacity(task.references.len());
        for reference in &task.references {
            let (code, mask) = loader.load_reference(reference.path, sample.dims())?;
            let score = compare(self.config.algorithm, &source, &code, mask.as_ref(), window)?;
            comparisons.push(Comparison {
                sample: task.sample,
                reference: reference.path,
                score,
                genuine: reference.genuine,
            });
        }
        trace_debug!(
            "sample_scored",
            references = comparisons.len(),
            alignments = source.alignments()
        );
        Ok(comparisons)
    }
}

fn finish<S, P>(mut tally: Tally<'_, S, P>, counts: PairCounts) -> ScoreHistogram
where
    S: ScoreSink + ?Sized,
    P: Progress + ?Sized,
{
    debug_assert_eq!(tally.done, counts.total());
    tally.progress.finish();
    trace_event!(
        "matches_done",
        genuine = tally.histogram.genuine_total(),
        impostor = tally.histogram.impostor_total()
    );
    tally.histogram
}
