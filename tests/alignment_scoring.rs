use hdeval::align::{max_hd, min_hd, ssf};
use hdeval::hamming::circular_shift;
use hdeval::lowlevel::{fractional_distance, scan_extrema};
use hdeval::{compare, Algorithm, BitTemplate, ByteWindow, HdEvalError, ShiftRange, ShiftSource};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_code(rng: &mut StdRng, row_bytes: usize, rows: usize) -> BitTemplate {
    let mut data = vec![0u8; row_bytes * rows];
    rng.fill(&mut data[..]);
    BitTemplate::from_rows(data, row_bytes, rows).unwrap()
}

/// Mask with roughly three out of four bits valid.
fn random_mask(rng: &mut StdRng, row_bytes: usize, rows: usize) -> BitTemplate {
    let data = (0..row_bytes * rows)
        .map(|_| rng.random::<u8>() | rng.random::<u8>())
        .collect();
    BitTemplate::from_rows(data, row_bytes, rows).unwrap()
}

fn full_window(code: &BitTemplate) -> ByteWindow {
    ByteWindow::full(code.byte_len()).unwrap()
}

#[test]
fn identical_templates_score_a_perfect_match() {
    let mut rng = StdRng::seed_from_u64(1);
    let code = random_code(&mut rng, 16, 1);
    assert_eq!(code.dims(), (128, 1));
    let window = full_window(&code);
    let source = ShiftSource::Range {
        code: &code,
        mask: None,
        range: ShiftRange::single(),
    };
    let extrema = scan_extrema(&source, &code, None, window).unwrap();
    assert_eq!(extrema.min, 0.0);
    assert_eq!(extrema.max, 0.0);
    assert_eq!(min_hd(&source, &code, None, window).unwrap(), 0.0);
    assert_eq!(max_hd(&source, &code, None, window).unwrap(), 1.0);
    assert_eq!(ssf(&source, &code, None, window).unwrap(), 0.5);
}

#[test]
fn complement_templates_disagree_everywhere() {
    let mut rng = StdRng::seed_from_u64(2);
    let code = random_code(&mut rng, 16, 1);
    let other = code.complement();
    let window = full_window(&code);
    assert_eq!(fractional_distance(&code, &other, None, window).unwrap(), 1.0);

    let source = ShiftSource::Range {
        code: &code,
        mask: None,
        range: ShiftRange::single(),
    };
    assert_eq!(compare(Algorithm::MinHd, &source, &other, None, window).unwrap(), 1.0);
    assert_eq!(compare(Algorithm::MaxHd, &source, &other, None, window).unwrap(), 0.0);
}

#[test]
fn min_and_max_bracket_the_unshifted_distance() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..20 {
        let a = random_code(&mut rng, 12, 4);
        let b = random_code(&mut rng, 12, 4);
        let window = full_window(&a);
        let source = ShiftSource::Range {
            code: &a,
            mask: None,
            range: ShiftRange::new(-5, 5, 2).unwrap(),
        };
        let at_zero = fractional_distance(&a, &b, None, window).unwrap();
        let best = min_hd(&source, &b, None, window).unwrap();
        let worst = 1.0 - max_hd(&source, &b, None, window).unwrap();
        assert!(best <= at_zero && at_zero <= worst, "{best} {at_zero} {worst}");
    }
}

#[test]
fn ssf_fuses_best_and_worst_alignment() {
    let mut rng = StdRng::seed_from_u64(4);
    let a = random_code(&mut rng, 20, 2);
    let b = random_code(&mut rng, 20, 2);
    let window = full_window(&a);
    let range = ShiftRange::new(-3, 3, 4).unwrap();
    let source = ShiftSource::Range {
        code: &a,
        mask: None,
        range,
    };

    // Independent scan over materialized shifts.
    let distances: Vec<f64> = range
        .bit_shifts()
        .map(|s| fractional_distance(&circular_shift(&a, s), &b, None, window).unwrap())
        .collect();
    let min = distances.iter().copied().fold(f64::INFINITY, f64::min);
    let max = distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let fused = ssf(&source, &b, None, window).unwrap();
    assert!((fused - ((1.0 - max) + min) / 2.0).abs() < 1e-12);
    assert!((min_hd(&source, &b, None, window).unwrap() - min).abs() < 1e-12);
}

#[test]
fn shifted_copy_is_recovered_by_range_scan() {
    let mut rng = StdRng::seed_from_u64(5);
    let reference = random_code(&mut rng, 16, 4);
    let sample = circular_shift(&reference, 3);
    let window = full_window(&reference);
    let source = ShiftSource::Range {
        code: &sample,
        mask: None,
        range: ShiftRange::new(-4, 4, 1).unwrap(),
    };
    assert_eq!(min_hd(&source, &reference, None, window).unwrap(), 0.0);
}

#[test]
fn precomputed_variants_score_like_range() {
    let mut rng = StdRng::seed_from_u64(6);
    let sample = random_code(&mut rng, 10, 3);
    let sample_mask = random_mask(&mut rng, 10, 3);
    let reference = random_code(&mut rng, 10, 3);
    let reference_mask = random_mask(&mut rng, 10, 3);
    let window = ByteWindow::from_bits(16, 200, sample.byte_len()).unwrap();
    let range = ShiftRange::new(-6, 6, 2).unwrap();

    let codes: Vec<BitTemplate> = range.bit_shifts().map(|s| circular_shift(&sample, s)).collect();
    let masks: Vec<BitTemplate> = range
        .bit_shifts()
        .map(|s| circular_shift(&sample_mask, s))
        .collect();

    for masked in [false, true] {
        let ranged = ShiftSource::Range {
            code: &sample,
            mask: masked.then_some(&sample_mask),
            range,
        };
        let precomputed = ShiftSource::Precomputed {
            codes: &codes,
            masks: masked.then_some(masks.as_slice()),
        };
        for algorithm in [Algorithm::MinHd, Algorithm::MaxHd, Algorithm::Ssf] {
            let a = compare(algorithm, &ranged, &reference, Some(&reference_mask), window).unwrap();
            let b = compare(algorithm, &precomputed, &reference, Some(&reference_mask), window)
                .unwrap();
            assert_eq!(a, b, "{algorithm:?} masked={masked}");
        }
    }
}

#[test]
fn masks_apply_only_when_both_sides_have_one() {
    let sample = BitTemplate::new(vec![0xFF, 0x00], 16, 1).unwrap();
    let reference = BitTemplate::new(vec![0x00, 0x00], 16, 1).unwrap();
    let sample_mask = BitTemplate::new(vec![0x00, 0xFF], 16, 1).unwrap();
    let reference_mask = BitTemplate::filled(16, 1).unwrap();
    let window = full_window(&sample);

    let unmasked_sample = ShiftSource::Range {
        code: &sample,
        mask: None,
        range: ShiftRange::single(),
    };
    // Reference mask alone: every bit counts.
    assert_eq!(
        min_hd(&unmasked_sample, &reference, Some(&reference_mask), window).unwrap(),
        0.5
    );

    let masked_sample = ShiftSource::Range {
        code: &sample,
        mask: Some(&sample_mask),
        range: ShiftRange::single(),
    };
    // Sample mask alone: every bit counts.
    assert_eq!(min_hd(&masked_sample, &reference, None, window).unwrap(), 0.5);
    // Both masks: only the agreeing second byte is compared.
    assert_eq!(
        min_hd(&masked_sample, &reference, Some(&reference_mask), window).unwrap(),
        0.0
    );
}

#[test]
fn alignment_without_valid_bits_scores_zero() {
    let sample = BitTemplate::new(vec![0xFF, 0xFF], 16, 1).unwrap();
    let reference = sample.complement();
    let empty = BitTemplate::new(vec![0x00, 0x00], 16, 1).unwrap();
    let window = full_window(&sample);
    let source = ShiftSource::Range {
        code: &sample,
        mask: Some(&empty),
        range: ShiftRange::single(),
    };
    assert_eq!(min_hd(&source, &reference, Some(&empty), window).unwrap(), 0.0);
    assert_eq!(
        fractional_distance(&sample, &reference, Some((&empty, &empty)), window).unwrap(),
        0.0
    );
}

#[test]
fn precomputed_masks_must_match_variant_count() {
    let code = BitTemplate::filled(16, 1).unwrap();
    let codes = vec![code.clone(), code.clone()];
    let masks = vec![code.clone()];
    let source = ShiftSource::Precomputed {
        codes: &codes,
        masks: Some(&masks),
    };
    let err = min_hd(&source, &code, Some(&code), full_window(&code)).unwrap_err();
    assert_eq!(err, HdEvalError::MaskCountMismatch { codes: 2, masks: 1 });
}

#[test]
fn reference_shape_must_match_sample() {
    let sample = BitTemplate::filled(16, 2).unwrap();
    let reference = BitTemplate::filled(32, 1).unwrap();
    let source = ShiftSource::Range {
        code: &sample,
        mask: None,
        range: ShiftRange::single(),
    };
    assert!(matches!(
        min_hd(&source, &reference, None, full_window(&sample)),
        Err(HdEvalError::DimensionMismatch { .. })
    ));
}
