use approx::assert_abs_diff_eq;
use causalmeasure::errors::EstimatorError;
use causalmeasure::estimators::{
    Dataset, InformationEstimator, KnnCmiEstimator, MeasureDefinition,
};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

fn gaussian(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    (0..n).map(|_| normal.sample(&mut rng)).collect()
}

/// Correlated bivariate normal with correlation rho.
fn correlated_pair(n: usize, rho: f64, seed: u64) -> (Dataset, Dataset) {
    let e1 = gaussian(n, seed);
    let e2 = gaussian(n, seed + 1);
    let x: Vec<f64> = e1.clone();
    let y: Vec<f64> = e1
        .iter()
        .zip(e2.iter())
        .map(|(a, b)| rho * a + (1.0 - rho * rho).sqrt() * b)
        .collect();
    (
        Dataset::from_scalar(Array1::from(x)),
        Dataset::from_scalar(Array1::from(y)),
    )
}

#[test]
fn mi_matches_gaussian_analytic_value() {
    // I(X;Y) = -0.5 ln(1 - rho^2) for jointly Gaussian X, Y.
    let rho: f64 = 0.6;
    let (x, y) = correlated_pair(1500, rho, 11);
    let est = KnnCmiEstimator::new(4, 0).unwrap();
    let mi = est
        .estimate(&MeasureDefinition::mi_nats(), &x, &y, None)
        .unwrap();
    let analytic = -0.5 * (1.0 - rho * rho).ln();
    assert_abs_diff_eq!(mi, analytic, epsilon = 0.05);
}

#[test]
fn cmi_vanishes_for_markov_chain() {
    // X -> Y -> Z: I(X;Z|Y) = 0 while I(X;Z) stays clearly positive.
    let n = 1500;
    let ex = gaussian(n, 3);
    let ey = gaussian(n, 4);
    let ez = gaussian(n, 5);
    let x: Vec<f64> = ex.clone();
    let y: Vec<f64> = ex.iter().zip(ey.iter()).map(|(a, b)| a + 0.5 * b).collect();
    let z: Vec<f64> = y.iter().zip(ez.iter()).map(|(a, b)| a + 0.5 * b).collect();
    let x = Dataset::from_scalar(Array1::from(x));
    let y = Dataset::from_scalar(Array1::from(y));
    let z = Dataset::from_scalar(Array1::from(z));

    let est = KnnCmiEstimator::new(4, 0).unwrap();
    let cmi = est
        .estimate(&MeasureDefinition::cmi_nats(), &x, &z, Some(&y))
        .unwrap();
    let mi = est
        .estimate(&MeasureDefinition::mi_nats(), &x, &z, None)
        .unwrap();
    assert_abs_diff_eq!(cmi, 0.0, epsilon = 0.06);
    assert!(mi > 0.2, "unconditioned MI should be clearly positive, got {mi}");
}

#[test]
fn estimates_are_deterministic() {
    let (x, y) = correlated_pair(400, 0.4, 21);
    let est = KnnCmiEstimator::new(4, 2).unwrap();
    let a = est
        .estimate(&MeasureDefinition::mi_nats(), &x, &y, None)
        .unwrap();
    let b = est
        .estimate(&MeasureDefinition::mi_nats(), &x, &y, None)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn independent_inputs_give_small_but_possibly_negative_mi() {
    let x = Dataset::from_scalar(Array1::from(gaussian(1200, 31)));
    let y = Dataset::from_scalar(Array1::from(gaussian(1200, 32)));
    let est = KnnCmiEstimator::new(4, 0).unwrap();
    let mi = est
        .estimate(&MeasureDefinition::mi_nats(), &x, &y, None)
        .unwrap();
    // Near independence KSG-family bias can dip below zero; only the
    // magnitude has to be small.
    assert!(mi.abs() < 0.05, "expected near-zero MI, got {mi}");
}

#[test]
fn duplicate_points_use_the_range_count_correction() {
    // Heavily tied data: every value is one of four levels, so k-th
    // neighbor distances collapse to zero and the k_hat correction kicks in.
    let n = 400;
    let x: Vec<f64> = (0..n).map(|i| (i % 4) as f64).collect();
    let y: Vec<f64> = (0..n).map(|i| ((i / 2) % 4) as f64).collect();
    let x = Dataset::from_scalar(Array1::from(x));
    let y = Dataset::from_scalar(Array1::from(y));
    let est = KnnCmiEstimator::new(4, 0).unwrap();
    let mi = est
        .estimate(&MeasureDefinition::mi_nats(), &x, &y, None)
        .unwrap();
    assert!(mi.is_finite());
}

#[test]
fn base_conversion_rescales_the_estimate() {
    let (x, y) = correlated_pair(800, 0.7, 41);
    let est = KnnCmiEstimator::new(4, 0).unwrap();
    let nats = est
        .estimate(&MeasureDefinition::mi_nats(), &x, &y, None)
        .unwrap();
    let bits = est
        .estimate(
            &MeasureDefinition::new(
                causalmeasure::estimators::MeasureKind::MutualInformation,
                2.0,
            )
            .unwrap(),
            &x,
            &y,
            None,
        )
        .unwrap();
    assert_abs_diff_eq!(bits, nats / std::f64::consts::LN_2, epsilon = 1e-12);
}

#[test]
fn rejects_length_mismatch_and_wrong_measure_shape() {
    let x = Dataset::from_scalar(Array1::from(gaussian(100, 51)));
    let y = Dataset::from_scalar(Array1::from(gaussian(90, 52)));
    let est = KnnCmiEstimator::new(4, 0).unwrap();
    assert!(matches!(
        est.estimate(&MeasureDefinition::mi_nats(), &x, &y, None),
        Err(EstimatorError::DimensionMismatch(_))
    ));

    let y_full = Dataset::from_scalar(Array1::from(gaussian(100, 53)));
    let z = Dataset::from_scalar(Array1::from(gaussian(100, 54)));
    assert!(matches!(
        est.estimate(&MeasureDefinition::mi_nats(), &x, &y_full, Some(&z)),
        Err(EstimatorError::Configuration(_))
    ));
    assert!(matches!(
        est.estimate(&MeasureDefinition::cmi_nats(), &x, &y_full, None),
        Err(EstimatorError::Configuration(_))
    ));
}

#[test]
fn rejects_k_of_zero_and_too_few_samples() {
    assert!(matches!(
        KnnCmiEstimator::new(0, 0),
        Err(EstimatorError::Configuration(_))
    ));
    let x = Dataset::from_scalar(Array1::from(vec![1.0, 2.0, 3.0]));
    let y = Dataset::from_scalar(Array1::from(vec![4.0, 5.0, 6.0]));
    let est = KnnCmiEstimator::new(5, 0).unwrap();
    assert!(matches!(
        est.estimate(&MeasureDefinition::mi_nats(), &x, &y, None),
        Err(EstimatorError::Configuration(_))
    ));
}
