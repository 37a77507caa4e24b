#![cfg(feature = "rayon")]

use hdeval::eval::WildcardPattern;
use hdeval::hamming::circular_shift;
use hdeval::{
    Algorithm, BitTemplate, CodeLoader, Comparison, EnumerationPolicy, EvalConfig, Evaluator,
    HdEvalError, HdEvalResult, MaskRules, NoProgress, PathResolver, ScoreHistogram, ScoreSink,
    ShiftMode, ShiftRange,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Default)]
struct MemoryStore {
    files: BTreeMap<PathBuf, BitTemplate>,
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
struct Recorder(Vec<(PathBuf, PathBuf, f64, bool)>);

impl ScoreSink for Recorder {
    fn accept(&mut self, comparison: &Comparison<'_>) -> HdEvalResult<()> {
        self.0.push((
            comparison.sample.to_path_buf(),
            comparison.reference.to_path_buf(),
            comparison.score,
            comparison.genuine,
        ));
        Ok(())
    }
}

fn make_corpus(users: usize, per_user: usize) -> MemoryStore {
    let mut rng = StdRng::seed_from_u64(42);
    let mut store = MemoryStore::default();
    for user in 0..users {
        let mut base = vec![0u8; 64];
        rng.fill(&mut base[..]);
        let base = BitTemplate::from_rows(base, 16, 4).unwrap();
        for idx in 0..per_user {
            let shift = rng.random_range(-6i64..=6);
            let mut code = circular_shift(&base, shift).as_bytes().to_vec();
            // Sprinkle noise so genuine scores spread over several bins.
            for _ in 0..rng.random_range(0..40) {
                let bit = rng.random_range(0..code.len() * 8);
                code[bit / 8] ^= 0x80 >> (bit % 8);
            }
            let mut mask = vec![0xFFu8; 64];
            for byte in mask.iter_mut().take(rng.random_range(0..8)) {
                *byte = 0;
            }
            store.files.insert(
                PathBuf::from(format!("codes/u{user:02}/{idx}.code")),
                BitTemplate::from_rows(code, 16, 4).unwrap(),
            );
            store.files.insert(
                PathBuf::from(format!("masks/u{user:02}/{idx}.mask")),
                BitTemplate::from_rows(mask, 16, 4).unwrap(),
            );
        }
    }
    store
}

fn evaluate(store: &MemoryStore, config: EvalConfig) -> (ScoreHistogram, Recorder) {
    let evaluator = Evaluator::new(config, store, store).unwrap();
    let group = evaluator.discover("?1").unwrap();
    let mut recorder = Recorder::default();
    let histogram = evaluator
        .run(&group, &mut recorder, &mut NoProgress)
        .unwrap();
    (histogram, recorder)
}

#[test]
fn parallel_matches_sequential() {
    let store = make_corpus(9, 4);
    for (algorithm, policy) in [
        (Algorithm::MinHd, EnumerationPolicy::AllPairs),
        (Algorithm::Ssf, EnumerationPolicy::Balanced),
        (Algorithm::MaxHd, EnumerationPolicy::AllPairs),
    ] {
        let base = EvalConfig {
            algorithm,
            policy,
            shifts: ShiftMode::Range(ShiftRange::new(-8, 8, 1).unwrap()),
            masks: Some(MaskRules::shared("masks/?1/?2.mask")),
            bins: 200,
            ..EvalConfig::new("codes/*/*.code")
        };
        let parallel = EvalConfig {
            parallel: true,
            ..base.clone()
        };

        let (seq_hist, seq_scores) = evaluate(&store, base);
        let (par_hist, par_scores) = evaluate(&store, parallel);
        assert_eq!(seq_hist, par_hist, "{algorithm:?} {policy:?}");
        assert_eq!(seq_scores.0, par_scores.0, "{algorithm:?} {policy:?}");
    }
}

#[test]
fn parallel_run_propagates_errors() {
    let mut store = make_corpus(6, 3);
    store.files.remove(Path::new("masks/u03/1.mask"));
    let config = EvalConfig {
        masks: Some(MaskRules::shared("masks/?1/?2.mask")),
        parallel: true,
        ..EvalConfig::new("codes/*/*.code")
    };
    let evaluator = Evaluator::new(config, &store, &store).unwrap();
    let group = evaluator.discover("?1").unwrap();
    let mut recorder = Recorder::default();
    let err = evaluator
        .run(&group, &mut recorder, &mut NoProgress)
        .unwrap_err();
    assert!(matches!(err, HdEvalError::Decode { .. }));
}
