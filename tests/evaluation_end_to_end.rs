use hdeval::eval::{enumerate_pairs, planned_counts, PairCounts, WildcardPattern};
use hdeval::hamming::circular_shift;
use hdeval::{
    Algorithm, BitTemplate, CodeLoader, Comparison, EnumerationPolicy, EvalConfig, Evaluator,
    HdEvalError, HdEvalResult, MaskRules, NoProgress, NullSink, PathResolver, Progress,
    ScoreHistogram, ScoreSink, ShiftMode, ShiftRange,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Code files kept in memory, addressed by path.
#[derive(Default)]
struct MemoryStore {
    files: BTreeMap<PathBuf, BitTemplate>,
}

impl MemoryStore {
    fn insert(&mut self, path: &str, code: BitTemplate) {
        self.files.insert(PathBuf::from(path), code);
    }
}

impl CodeLoader for MemoryStore {
    fn load(&self, path: &Path) -> HdEvalResult<BitTemplate> {
        self.files.get(path).cloned().ok_or_else(|| HdEvalError::Decode {
            path: path.to_path_buf(),
            reason: "no such file".to_string(),
        })
    }
}

impl PathResolver for MemoryStore {
    fn expand(&self, pattern: &str) -> HdEvalResult<Vec<PathBuf>> {
        let pattern = WildcardPattern::new(pattern);
        Ok(self
            .files
            .keys()
            .filter(|path| pattern.matches(&path.to_string_lossy()))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct Recorder {
    scores: Vec<(String, String, f64, bool)>,
}

impl ScoreSink for Recorder {
    fn accept(&mut self, comparison: &Comparison<'_>) -> HdEvalResult<()> {
        self.scores.push((
            comparison.sample.to_string_lossy().into_owned(),
            comparison.reference.to_string_lossy().into_owned(),
            comparison.score,
            comparison.genuine,
        ));
        Ok(())
    }
}

#[derive(Default)]
struct CountingProgress {
    total: u64,
    updates: Vec<u64>,
    finished: bool,
}

impl Progress for CountingProgress {
    fn start(&mut self, total: u64) {
        self.total = total;
    }

    fn advance(&mut self, done: u64) {
        self.updates.push(done);
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

fn random_code(rng: &mut StdRng) -> BitTemplate {
    let mut data = vec![0u8; 32];
    rng.fill(&mut data[..]);
    BitTemplate::from_rows(data, 8, 4).unwrap()
}

/// Users `a` (3 templates), `b` (2) and `c` (1); every user's templates are
/// small rotations of one base code.
fn corpus(seed: u64) -> MemoryStore {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut store = MemoryStore::default();
    for (user, count) in [("a", 3), ("b", 2), ("c", 1)] {
        let base = random_code(&mut rng);
        for idx in 0..count {
            let code = circular_shift(&base, idx as i64 - 1);
            store.insert(&format!("codes/{user}/{idx}.code"), code);
            store.insert(&format!("masks/{user}/{idx}.mask"), BitTemplate::filled(64, 4).unwrap());
        }
    }
    store
}

fn run(
    store: &MemoryStore,
    config: EvalConfig,
) -> HdEvalResult<(ScoreHistogram, Vec<(String, String, f64, bool)>)> {
    let evaluator = Evaluator::new(config, store, store)?;
    let group = evaluator.discover("?1")?;
    let mut recorder = Recorder::default();
    let histogram = evaluator.run(&group, &mut recorder, &mut NoProgress)?;
    Ok((histogram, recorder.scores))
}

#[test]
fn all_pairs_compares_every_pair_once() {
    let store = corpus(1);
    let config = EvalConfig::new("codes/*/*.code");
    let (histogram, scores) = run(&store, config).unwrap();

    assert_eq!(histogram.genuine_total(), 4);
    assert_eq!(histogram.impostor_total(), 11);
    assert_eq!(scores.len(), 15);

    let mut seen = std::collections::BTreeSet::new();
    for (sample, reference, _, genuine) in &scores {
        assert_ne!(sample, reference);
        assert!(seen.insert((sample.min(reference).clone(), sample.max(reference).clone())));
        let same_user = sample.split('/').nth(1) == reference.split('/').nth(1);
        assert_eq!(*genuine, same_user);
    }

    // Genuine references of a sample come before its impostor references.
    let first: Vec<&str> = scores
        .iter()
        .filter(|s| s.0 == "codes/a/0.code")
        .map(|s| s.1.as_str())
        .collect();
    assert_eq!(
        first,
        vec![
            "codes/a/1.code",
            "codes/a/2.code",
            "codes/b/0.code",
            "codes/b/1.code",
            "codes/c/0.code",
        ]
    );
}

#[test]
fn balanced_limits_impostors_to_first_templates() {
    let store = corpus(2);
    let config = EvalConfig {
        policy: EnumerationPolicy::Balanced,
        ..EvalConfig::new("codes/*/*.code")
    };
    let (histogram, scores) = run(&store, config).unwrap();
    assert_eq!(histogram.genuine_total(), 4);
    assert_eq!(histogram.impostor_total(), 3);
    let impostors: Vec<(&str, &str)> = scores
        .iter()
        .filter(|s| !s.3)
        .map(|s| (s.0.as_str(), s.1.as_str()))
        .collect();
    assert_eq!(
        impostors,
        vec![
            ("codes/a/0.code", "codes/b/0.code"),
            ("codes/a/0.code", "codes/c/0.code"),
            ("codes/b/0.code", "codes/c/0.code"),
        ]
    );
}

#[test]
fn planned_counts_match_enumeration() {
    let store = corpus(3);
    let evaluator = Evaluator::new(EvalConfig::new("codes/*/*.code"), &store, &store).unwrap();
    let group = evaluator.discover("?1").unwrap();
    assert_eq!(group.user_count(), 3);
    assert_eq!(group.template_count(), 6);

    for (policy, expected) in [
        (
            EnumerationPolicy::AllPairs,
            PairCounts {
                genuine: 4,
                impostor: 11,
            },
        ),
        (
            EnumerationPolicy::Balanced,
            PairCounts {
                genuine: 4,
                impostor: 3,
            },
        ),
    ] {
        assert_eq!(planned_counts(&group, policy), expected);
        let tasks = enumerate_pairs(&group, policy);
        let genuine: usize = tasks
            .iter()
            .map(|t| t.references.iter().filter(|r| r.genuine).count())
            .sum();
        let total: usize = tasks.iter().map(|t| t.references.len()).sum();
        assert_eq!(genuine as u64, expected.genuine);
        assert_eq!(total as u64, expected.total());
        // The last template of the last user has nothing left to compare.
        assert!(tasks.iter().all(|t| !t.references.is_empty()));
    }
}

#[test]
fn rotated_genuine_templates_match_within_shift_range() {
    let store = corpus(4);
    let config = EvalConfig {
        shifts: ShiftMode::Range(ShiftRange::new(-2, 2, 1).unwrap()),
        masks: Some(MaskRules::shared("masks/?1/?2.mask")),
        ..EvalConfig::new("codes/*/*.code")
    };
    let (histogram, scores) = run(&store, config).unwrap();
    for (_, _, score, genuine) in &scores {
        if *genuine {
            assert_eq!(*score, 0.0);
        } else {
            assert!(*score > 0.0);
        }
    }
    assert_eq!(histogram.genuine()[0], 4);
}

#[test]
fn progress_reports_planned_total() {
    let store = corpus(5);
    let evaluator = Evaluator::new(EvalConfig::new("codes/*/*.code"), &store, &store).unwrap();
    let group = evaluator.discover("?1").unwrap();
    let mut progress = CountingProgress::default();
    evaluator.run(&group, &mut NullSink, &mut progress).unwrap();
    assert_eq!(progress.total, 15);
    assert_eq!(progress.updates.last(), Some(&15));
    assert!(progress.updates.windows(2).all(|w| w[0] < w[1]));
    assert!(progress.finished);
}

#[test]
fn precomputed_shifts_match_range_evaluation() {
    let mut rng = StdRng::seed_from_u64(6);
    let range = ShiftRange::new(-2, 2, 3).unwrap();
    let mut store = MemoryStore::default();
    for user in ["u1", "u2"] {
        for idx in 0..2 {
            let code = random_code(&mut rng);
            let mut mask_data = vec![0u8; 32];
            rng.fill(&mut mask_data[..]);
            let mask = BitTemplate::from_rows(mask_data, 8, 4).unwrap();
            for (k, shift) in range.bit_shifts().enumerate() {
                store.insert(
                    &format!("shifted/{user}/{idx}_{k}.code"),
                    circular_shift(&code, shift),
                );
                store.insert(
                    &format!("shifted_masks/{user}/{idx}_{k}.mask"),
                    circular_shift(&mask, shift),
                );
            }
            store.insert(&format!("codes/{user}/{idx}.code"), code);
            store.insert(&format!("masks/{user}/{idx}.mask"), mask);
        }
    }

    let ranged = EvalConfig {
        algorithm: Algorithm::Ssf,
        shifts: ShiftMode::Range(range),
        masks: Some(MaskRules::shared("masks/?1/?2.mask")),
        bins: 50,
        ..EvalConfig::new("codes/*/*.code")
    };
    let precomputed = EvalConfig {
        shifts: ShiftMode::Precomputed {
            rule: "shifted/?1/?2_*.code".to_string(),
        },
        masks: Some(MaskRules {
            sample: "shifted_masks/?1/?2_!1.mask".to_string(),
            reference: Some("masks/?1/?2.mask".to_string()),
        }),
        ..ranged.clone()
    };

    let (hist_a, scores_a) = run(&store, ranged).unwrap();
    let (hist_b, scores_b) = run(&store, precomputed).unwrap();
    assert_eq!(scores_a.len(), 6);
    assert_eq!(hist_a, hist_b);
    assert_eq!(scores_a, scores_b);
}

#[test]
fn mismatched_reference_shape_aborts_run() {
    let mut store = corpus(7);
    store.insert("codes/c/0.code", BitTemplate::filled(32, 8).unwrap());
    let err = run(&store, EvalConfig::new("codes/*/*.code")).unwrap_err();
    assert_eq!(
        err,
        HdEvalError::DimensionMismatch {
            context: "reference code",
            expected: (64, 4),
            got: (32, 8),
        }
    );
}

fn masked(pattern: &str) -> EvalConfig {
    EvalConfig {
        masks: Some(MaskRules::shared("masks/?1/?2.mask")),
        ..EvalConfig::new(pattern)
    }
}

#[test]
fn mismatched_sample_mask_aborts_run() {
    let mut store = corpus(10);
    store.insert("masks/a/0.mask", BitTemplate::filled(64, 2).unwrap());
    let err = run(&store, masked("codes/*/*.code")).unwrap_err();
    assert_eq!(
        err,
        HdEvalError::DimensionMismatch {
            context: "sample mask",
            expected: (64, 4),
            got: (64, 2),
        }
    );
}

#[test]
fn mismatched_reference_mask_aborts_run() {
    let mut store = corpus(11);
    store.insert("masks/a/1.mask", BitTemplate::filled(128, 4).unwrap());
    let err = run(&store, masked("codes/*/*.code")).unwrap_err();
    assert_eq!(
        err,
        HdEvalError::DimensionMismatch {
            context: "reference mask",
            expected: (64, 4),
            got: (128, 4),
        }
    );
}

#[test]
fn missing_mask_is_a_decode_error() {
    let store = corpus(8);
    let config = EvalConfig {
        masks: Some(MaskRules::shared("missing/?1/?2.mask")),
        ..EvalConfig::new("codes/*/*.code")
    };
    let err = run(&store, config).unwrap_err();
    assert!(matches!(err, HdEvalError::Decode { path, .. } if path == Path::new("missing/a/0.mask")));
}

#[test]
fn empty_input_pattern_is_reported() {
    let store = corpus(9);
    let err = run(&store, EvalConfig::new("nothing/*/*.code")).unwrap_err();
    assert_eq!(
        err,
        HdEvalError::NoInputFiles {
            pattern: "nothing/*/*.code".to_string(),
        }
    );
}

#[test]
fn comparison_window_restricts_scored_bits() {
    let mut store = MemoryStore::default();
    // Templates differ only in their first byte.
    store.insert("codes/a/0.code", BitTemplate::new(vec![0xFF, 0, 0, 0], 32, 1).unwrap());
    store.insert("codes/b/0.code", BitTemplate::new(vec![0x00, 0, 0, 0], 32, 1).unwrap());
    let (_, full) = run(&store, EvalConfig::new("codes/*/*.code")).unwrap();
    assert_eq!(full[0].2, 0.25);

    let config = EvalConfig {
        bits: Some((8, 32)),
        ..EvalConfig::new("codes/*/*.code")
    };
    let (_, windowed) = run(&store, config).unwrap();
    assert_eq!(windowed[0].2, 0.0);
}
