use causalmeasure::errors::EstimatorError;
use causalmeasure::estimators::synchrony::{MMeasure, SMeasure};
use causalmeasure::estimators::Dataset;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

fn noisy_points(n: usize, dim: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    Dataset::from_points(Array2::from_shape_fn((n, dim), |_| normal.sample(&mut rng)))
}

/// y is x plus small noise, so their neighborhoods agree almost everywhere.
fn coupled_pair(n: usize, seed: u64) -> (Dataset, Dataset) {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let x = Array2::from_shape_fn((n, 2), |_| normal.sample(&mut rng));
    let y = x.mapv(|v| v + 0.05 * normal.sample(&mut rng));
    (Dataset::from_points(x), Dataset::from_points(y))
}

#[test]
fn s_measure_separates_coupled_from_independent() {
    let (x, y) = coupled_pair(600, 3);
    let y_ind = noisy_points(600, 2, 4);
    let s = SMeasure::new(5, 0).unwrap();
    let coupled = s.compute(&x, &y).unwrap();
    let independent = s.compute(&x, &y_ind).unwrap();
    assert!(
        coupled > 2.0 * independent,
        "coupled {coupled} vs independent {independent}"
    );
    assert!(coupled > 0.5, "strong coupling should push S toward 1, got {coupled}");
    assert!(independent < 0.2, "independent S should stay small, got {independent}");
}

#[test]
fn m_measure_separates_coupled_from_independent() {
    let (x, y) = coupled_pair(600, 13);
    let y_ind = noisy_points(600, 2, 14);
    let m = MMeasure::new(5, 0).unwrap();
    let coupled = m.compute(&x, &y).unwrap();
    let independent = m.compute(&x, &y_ind).unwrap();
    assert!(
        coupled > independent + 0.3,
        "coupled {coupled} vs independent {independent}"
    );
    assert!(coupled > 0.8, "strong coupling should push M toward 1, got {coupled}");
}

#[test]
fn measures_are_asymmetric_for_one_way_coupling() {
    // y keeps the structure of x in one coordinate but collapses the other,
    // so knowing y pins down x's neighborhood better than the reverse.
    let mut rng = StdRng::seed_from_u64(23);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let n = 600;
    let x = Array2::from_shape_fn((n, 2), |_| normal.sample(&mut rng));
    let mut y = x.clone();
    for mut row in y.rows_mut() {
        row[1] = 0.05 * normal.sample(&mut rng);
    }
    let x = Dataset::from_points(x);
    let y = Dataset::from_points(y);
    let s = SMeasure::new(5, 0).unwrap();
    let forward = s.compute(&x, &y).unwrap();
    let backward = s.compute(&y, &x).unwrap();
    assert_ne!(forward, backward);
}

#[test]
fn theiler_window_changes_the_result_for_autocorrelated_data() {
    // Smooth series: temporal neighbors double as spatial neighbors, so
    // excluding them must change the estimate.
    let n = 400;
    let x = Dataset::from_points(Array2::from_shape_fn((n, 1), |(i, _)| {
        (i as f64 * 0.05).sin()
    }));
    let y = Dataset::from_points(Array2::from_shape_fn((n, 1), |(i, _)| {
        (i as f64 * 0.05 + 0.3).sin()
    }));
    let plain = SMeasure::new(5, 0).unwrap().compute(&x, &y).unwrap();
    let windowed = SMeasure::new(5, 20).unwrap().compute(&x, &y).unwrap();
    assert_ne!(plain, windowed);
}

#[test]
fn duplicate_points_are_reported_as_degenerate() {
    let x = Dataset::from_points(Array2::zeros((50, 2)));
    let y = noisy_points(50, 2, 31);
    let s = SMeasure::new(3, 0).unwrap();
    assert!(matches!(
        s.compute(&x, &y),
        Err(EstimatorError::DegenerateNeighborhood { .. })
    ));
}

#[test]
fn rejects_invalid_configuration_and_mismatched_inputs() {
    assert!(matches!(
        SMeasure::new(0, 0),
        Err(EstimatorError::Configuration(_))
    ));
    assert!(matches!(
        MMeasure::new(0, 0),
        Err(EstimatorError::Configuration(_))
    ));
    let x = noisy_points(100, 2, 41);
    let y = noisy_points(90, 2, 42);
    let s = SMeasure::new(3, 0).unwrap();
    assert!(matches!(
        s.compute(&x, &y),
        Err(EstimatorError::DimensionMismatch(_))
    ));
    let y_short = noisy_points(5, 2, 43);
    let x_short = noisy_points(5, 2, 44);
    let s_big = SMeasure::new(10, 0).unwrap();
    assert!(matches!(
        s_big.compute(&x_short, &y_short),
        Err(EstimatorError::Configuration(_))
    ));
}
