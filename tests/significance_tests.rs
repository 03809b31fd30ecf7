use causalmeasure::errors::EstimatorError;
use causalmeasure::estimators::{
    Dataset, InformationEstimator, KnnCmiEstimator, MeasureDefinition, PluginCmiEstimator,
    ShannonIdentity,
};
use causalmeasure::significance::{IndependenceTest, Resampling, SurrogateKind};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn uniform(n: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    Dataset::from_scalar(Array1::from_iter((0..n).map(|_| rng.gen_range(0.0..1.0))))
}

fn plugin_mi_test(resamples: usize) -> IndependenceTest<PluginCmiEstimator> {
    IndependenceTest::new(
        MeasureDefinition::mi_nats(),
        PluginCmiEstimator::new(6, ShannonIdentity::Direct).unwrap(),
        resamples,
        Resampling::Surrogate(SurrogateKind::Shuffle),
    )
    .unwrap()
}

#[test]
fn p_value_is_always_in_unit_interval_excluding_zero() {
    let mut rng = StdRng::seed_from_u64(1);
    for resamples in [0usize, 1, 7, 50] {
        let test = plugin_mi_test(resamples);
        let x = uniform(200, 100 + resamples as u64);
        let y = uniform(200, 200 + resamples as u64);
        let result = test.run(&x, &y, None, &mut rng).unwrap();
        assert!(result.p_value > 0.0 && result.p_value <= 1.0);
        assert_eq!(result.null_distribution.len(), resamples);
    }
}

#[test]
fn zero_resamples_give_p_value_one() {
    let mut rng = StdRng::seed_from_u64(2);
    let test = plugin_mi_test(0);
    let result = test
        .run(&uniform(100, 1), &uniform(100, 2), None, &mut rng)
        .unwrap();
    assert_eq!(result.p_value, 1.0);
}

#[test]
fn strong_dependence_is_rejected() {
    let mut rng = StdRng::seed_from_u64(3);
    let x = uniform(1000, 5);
    // y is a noisy copy of x.
    let noise = uniform(1000, 6);
    let y = Dataset::from_scalar(Array1::from_iter(
        (0..1000).map(|i| x.row(i)[0] + 0.02 * noise.row(i)[0]),
    ));
    let test = plugin_mi_test(99);
    let result = test.run(&x, &y, None, &mut rng).unwrap();
    assert!(result.rejects(0.05), "p = {}", result.p_value);
    assert_eq!(result.p_value, 0.01);
}

#[test]
fn independent_noise_rarely_rejects() {
    // Repeated-trial false-positive check at alpha = 0.01: with 30 seeded
    // trials the expected number of rejections is 0.3.
    let mut rejections = 0;
    let test = plugin_mi_test(99);
    for trial in 0..30u64 {
        let mut rng = StdRng::seed_from_u64(1000 + trial);
        let x = uniform(4_000, 2000 + trial);
        let y = uniform(4_000, 3000 + trial);
        let result = test.run(&x, &y, None, &mut rng).unwrap();
        if result.rejects(0.01) {
            rejections += 1;
        }
    }
    assert!(rejections <= 2, "false positives: {rejections}/30");
}

#[test]
fn knn_surrogate_test_detects_coupling() {
    let mut rng = StdRng::seed_from_u64(4);
    let n = 400;
    let x = uniform(n, 7);
    let y = Dataset::from_scalar(Array1::from_iter(
        (0..n).map(|i| (x.row(i)[0] * std::f64::consts::PI).sin()),
    ));
    let test = IndependenceTest::new(
        MeasureDefinition::mi_nats(),
        KnnCmiEstimator::new(4, 0).unwrap(),
        39,
        Resampling::Surrogate(SurrogateKind::Shuffle),
    )
    .unwrap();
    let result = test.run(&x, &y, None, &mut rng).unwrap();
    assert!(result.rejects(0.05), "p = {}", result.p_value);
}

#[test]
fn local_permutation_preserves_conditional_null() {
    // x and y are both driven by z but conditionally independent given z;
    // a local-permutation CMI test should not reject.
    let mut rng = StdRng::seed_from_u64(8);
    let mut data_rng = StdRng::seed_from_u64(9);
    let n = 800;
    let z: Vec<f64> = (0..n).map(|_| data_rng.gen_range(0.0..1.0)).collect();
    let x: Vec<f64> = z.iter().map(|v| v + 0.3 * data_rng.gen_range(-1.0..1.0)).collect();
    let y: Vec<f64> = z.iter().map(|v| v + 0.3 * data_rng.gen_range(-1.0..1.0)).collect();
    let x = Dataset::from_scalar(Array1::from(x));
    let y = Dataset::from_scalar(Array1::from(y));
    let z = Dataset::from_scalar(Array1::from(z));

    let test = IndependenceTest::new(
        MeasureDefinition::cmi_nats(),
        KnnCmiEstimator::new(4, 0).unwrap(),
        19,
        Resampling::LocalPermutation { neighbors: 8 },
    )
    .unwrap();
    let result = test.run(&x, &y, Some(&z), &mut rng).unwrap();
    assert!(!result.rejects(0.01), "p = {}", result.p_value);
}

#[test]
fn local_permutation_requires_conditioning_variable() {
    let mut rng = StdRng::seed_from_u64(10);
    let test = IndependenceTest::new(
        MeasureDefinition::mi_nats(),
        KnnCmiEstimator::new(4, 0).unwrap(),
        5,
        Resampling::LocalPermutation { neighbors: 4 },
    )
    .unwrap();
    let err = test
        .run(&uniform(100, 11), &uniform(100, 12), None, &mut rng)
        .unwrap_err();
    assert!(matches!(err, EstimatorError::ResampleFailure { .. }));
}

/// Estimator that only accepts x sorted by its first column; shuffling
/// surrogates violate that, which lets the test exercise the fatal
/// resample-failure path.
struct SortedOnlyEstimator;

impl InformationEstimator for SortedOnlyEstimator {
    fn estimate(
        &self,
        _measure: &MeasureDefinition,
        x: &Dataset,
        _y: &Dataset,
        _z: Option<&Dataset>,
    ) -> causalmeasure::errors::Result<f64> {
        let sorted = (1..x.len()).all(|i| x.row(i)[0] >= x.row(i - 1)[0]);
        if sorted {
            Ok(1.0)
        } else {
            Err(EstimatorError::Numeric("unsorted input".into()))
        }
    }
}

#[test]
fn resample_failure_aborts_the_whole_test() {
    let mut rng = StdRng::seed_from_u64(13);
    let x = Dataset::from_scalar(Array1::from_iter((0..50).map(|i| i as f64)));
    let y = uniform(50, 14);
    let test = IndependenceTest::new(
        MeasureDefinition::mi_nats(),
        SortedOnlyEstimator,
        9,
        Resampling::Surrogate(SurrogateKind::Shuffle),
    )
    .unwrap();
    let err = test.run(&x, &y, None, &mut rng).unwrap_err();
    match err {
        EstimatorError::ResampleFailure { index, .. } => assert_eq!(index, 0),
        other => panic!("expected ResampleFailure, got {other:?}"),
    }
}

#[test]
fn circular_shift_surrogates_run_and_decide() {
    let mut rng = StdRng::seed_from_u64(15);
    let test = IndependenceTest::new(
        MeasureDefinition::mi_nats(),
        PluginCmiEstimator::new(6, ShannonIdentity::Direct).unwrap(),
        49,
        Resampling::Surrogate(SurrogateKind::CircularShift),
    )
    .unwrap();
    let x = uniform(500, 16);
    let y = uniform(500, 17);
    let result = test.run(&x, &y, None, &mut rng).unwrap();
    assert!(result.p_value > 0.0 && result.p_value <= 1.0);
}
