// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::{EstimatorError, Result};
use crate::estimators::dataset::Dataset;
use crate::estimators::neighbors::{Metric, NeighborIndex};

/// Shared per-sample quantities for the nearest-neighbor synchronization
/// measures (Arnhold-style): squared-distance means in X over X's own
/// neighbors and over Y's neighbor indices.
struct ConditionedRadii {
    /// R_i^(k)(X): mean squared distance to the k nearest neighbors in X.
    own: f64,
    /// R_i^(k)(X|Y): mean squared distance in X to the samples that are the
    /// k nearest neighbors of i in Y.
    conditioned: f64,
}

fn conditioned_radii(
    x_idx: &NeighborIndex,
    y_idx: &NeighborIndex,
    i: usize,
    k: usize,
    theiler: usize,
) -> Result<ConditionedRadii> {
    let own_neigh = x_idx.k_nearest(i, k, theiler)?;
    let own = own_neigh
        .iter()
        .map(|&(_, j)| x_idx.squared_distance(i, j))
        .sum::<f64>()
        / k as f64;
    let cond_neigh = y_idx.k_nearest(i, k, theiler)?;
    let conditioned = cond_neigh
        .iter()
        .map(|&(_, j)| x_idx.squared_distance(i, j))
        .sum::<f64>()
        / k as f64;
    Ok(ConditionedRadii { own, conditioned })
}

fn check_pair(x: &Dataset, y: &Dataset, k: usize, theiler: usize) -> Result<usize> {
    if k < 1 {
        return Err(EstimatorError::Configuration(
            "neighbor count k must be >= 1".into(),
        ));
    }
    let n = x.len();
    if y.len() != n {
        return Err(EstimatorError::DimensionMismatch(format!(
            "input lengths differ: x={}, y={}",
            n,
            y.len()
        )));
    }
    if n <= k + theiler {
        return Err(EstimatorError::Configuration(format!(
            "need more than k + theiler = {} samples, got {n}",
            k + theiler
        )));
    }
    Ok(n)
}

/// S-measure of nonlinear interdependence, `S(X|Y)`:
/// the mean over samples of `R_i^(k)(X) / R_i^(k)(X|Y)`.
///
/// Values near 1 indicate strong synchronization of X by Y; values near 0
/// indicate independence. Asymmetric: compare with the swapped direction.
#[derive(Debug, Clone, Copy)]
pub struct SMeasure {
    k: usize,
    theiler: usize,
}

impl SMeasure {
    pub fn new(k: usize, theiler: usize) -> Result<Self> {
        if k < 1 {
            return Err(EstimatorError::Configuration(
                "neighbor count k must be >= 1".into(),
            ));
        }
        Ok(Self { k, theiler })
    }

    pub fn compute(&self, x: &Dataset, y: &Dataset) -> Result<f64> {
        let n = check_pair(x, y, self.k, self.theiler)?;
        let x_idx = NeighborIndex::build(x, Metric::Euclidean);
        let y_idx = NeighborIndex::build(y, Metric::Euclidean);
        let mut sum = 0.0;
        for i in 0..n {
            let r = conditioned_radii(&x_idx, &y_idx, i, self.k, self.theiler)?;
            if r.conditioned <= 0.0 {
                return Err(EstimatorError::DegenerateNeighborhood {
                    index: i,
                    reason: "zero conditioned neighbor radius (duplicate points)".into(),
                });
            }
            sum += r.own / r.conditioned;
        }
        Ok(sum / n as f64)
    }
}

/// M-measure of nonlinear interdependence, `M(X|Y)`:
/// the mean over samples of `(R_i(X) - R_i^(k)(X|Y)) / (R_i(X) - R_i^(k)(X))`
/// where `R_i(X)` is the mean squared distance to all other samples.
///
/// Normalized variant of the S-measure, close to 1 for strong dependence.
#[derive(Debug, Clone, Copy)]
pub struct MMeasure {
    k: usize,
    theiler: usize,
}

impl MMeasure {
    pub fn new(k: usize, theiler: usize) -> Result<Self> {
        if k < 1 {
            return Err(EstimatorError::Configuration(
                "neighbor count k must be >= 1".into(),
            ));
        }
        Ok(Self { k, theiler })
    }

    pub fn compute(&self, x: &Dataset, y: &Dataset) -> Result<f64> {
        let n = check_pair(x, y, self.k, self.theiler)?;
        let x_idx = NeighborIndex::build(x, Metric::Euclidean);
        let y_idx = NeighborIndex::build(y, Metric::Euclidean);
        let mut sum = 0.0;
        for i in 0..n {
            let r = conditioned_radii(&x_idx, &y_idx, i, self.k, self.theiler)?;
            let r_all = x_idx.mean_squared_distance_to_all(i, self.theiler)?;
            let denom = r_all - r.own;
            if denom <= 0.0 {
                return Err(EstimatorError::DegenerateNeighborhood {
                    index: i,
                    reason: "neighbor radius equals the global radius".into(),
                });
            }
            sum += (r_all - r.conditioned) / denom;
        }
        Ok(sum / n as f64)
    }
}
