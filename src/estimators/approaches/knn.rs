// SPDX-License-Identifier: MIT OR Apache-2.0

use statrs::function::gamma::digamma;

use crate::errors::{EstimatorError, Result};
use crate::estimators::dataset::Dataset;
use crate::estimators::measure::{MeasureDefinition, MeasureKind};
use crate::estimators::neighbors::{Metric, NeighborIndex};
use crate::estimators::traits::InformationEstimator;

/// Nearest-neighbor MI/CMI estimator of the Frenzel-Pompe / Vejmelka-Palus
/// family (KSG-style), Chebyshev metric in the joint space.
///
/// For each sample i, `d_i` is the distance to the k-th nearest neighbor in
/// the joint space (Theiler-excluded); neighbors within `d_i` are then counted
/// in the marginal spaces and combined through digamma terms:
///
/// - MI:  `psi(k) + psi(N) - psi(n_x + 1) - psi(n_y + 1)`
/// - CMI: `psi(k) - psi(n_xz + 1) - psi(n_yz + 1) + psi(n_z + 1)`
///
/// Marginal counts are strict (`< d_i`), the open-ball convention. When
/// `d_i == 0` (coincident points) the fixed k is replaced per point by the
/// exact count `k_hat_i` of joint-space duplicates, and the marginal counts
/// switch to inclusive zero-radius counts, so duplicates never produce a
/// silently biased or infinite value.
///
/// Estimates may come out slightly negative near independence; the true
/// quantity is non-negative but the estimator bias is not.
#[derive(Debug, Clone, Copy)]
pub struct KnnCmiEstimator {
    k: usize,
    theiler: usize,
}

impl KnnCmiEstimator {
    pub fn new(k: usize, theiler: usize) -> Result<Self> {
        if k < 1 {
            return Err(EstimatorError::Configuration(
                "neighbor count k must be >= 1".into(),
            ));
        }
        Ok(Self { k, theiler })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn theiler(&self) -> usize {
        self.theiler
    }

    fn check_inputs(
        &self,
        measure: &MeasureDefinition,
        x: &Dataset,
        y: &Dataset,
        z: Option<&Dataset>,
    ) -> Result<usize> {
        match (measure.kind, z.is_some()) {
            (MeasureKind::MutualInformation, true) => {
                return Err(EstimatorError::Configuration(
                    "mutual information takes no conditioning variable".into(),
                ));
            }
            (MeasureKind::ConditionalMutualInformation, false) => {
                return Err(EstimatorError::Configuration(
                    "conditional mutual information requires a conditioning variable".into(),
                ));
            }
            _ => {}
        }
        let n = x.len();
        if y.len() != n || z.map(|d| d.len() != n).unwrap_or(false) {
            return Err(EstimatorError::DimensionMismatch(format!(
                "input lengths differ: x={}, y={}, z={:?}",
                n,
                y.len(),
                z.map(Dataset::len)
            )));
        }
        if n <= self.k + self.theiler {
            return Err(EstimatorError::Configuration(format!(
                "need more than k + theiler = {} samples, got {n}",
                self.k + self.theiler
            )));
        }
        Ok(n)
    }
}

impl InformationEstimator for KnnCmiEstimator {
    fn estimate(
        &self,
        measure: &MeasureDefinition,
        x: &Dataset,
        y: &Dataset,
        z: Option<&Dataset>,
    ) -> Result<f64> {
        let n = self.check_inputs(measure, x, y, z)?;

        let joint = match z {
            Some(z) => Dataset::hstack(&[x, y, z])?,
            None => Dataset::hstack(&[x, y])?,
        };
        let joint_idx = NeighborIndex::build(&joint, Metric::Chebyshev);

        let mut sum_nats = 0.0;
        match z {
            None => {
                let x_idx = NeighborIndex::build(x, Metric::Chebyshev);
                let y_idx = NeighborIndex::build(y, Metric::Chebyshev);
                let psi_n = digamma(n as f64);
                for i in 0..n {
                    let d = joint_idx.kth_distance(i, self.k, self.theiler)?;
                    let (psi_k, n_x, n_y) = if d > 0.0 {
                        (
                            digamma(self.k as f64),
                            x_idx.count_within(i, d, self.theiler, false),
                            y_idx.count_within(i, d, self.theiler, false),
                        )
                    } else {
                        let k_hat = joint_idx.count_within(i, 0.0, self.theiler, true);
                        if k_hat == 0 {
                            return Err(EstimatorError::DegenerateNeighborhood {
                                index: i,
                                reason: "zero k-th distance without coincident points".into(),
                            });
                        }
                        (
                            digamma(k_hat as f64),
                            x_idx.count_within(i, 0.0, self.theiler, true),
                            y_idx.count_within(i, 0.0, self.theiler, true),
                        )
                    };
                    sum_nats += psi_k + psi_n
                        - digamma((n_x + 1) as f64)
                        - digamma((n_y + 1) as f64);
                }
            }
            Some(z) => {
                let xz = Dataset::hstack(&[x, z])?;
                let yz = Dataset::hstack(&[y, z])?;
                let xz_idx = NeighborIndex::build(&xz, Metric::Chebyshev);
                let yz_idx = NeighborIndex::build(&yz, Metric::Chebyshev);
                let z_idx = NeighborIndex::build(z, Metric::Chebyshev);
                for i in 0..n {
                    let d = joint_idx.kth_distance(i, self.k, self.theiler)?;
                    let (psi_k, n_xz, n_yz, n_z) = if d > 0.0 {
                        (
                            digamma(self.k as f64),
                            xz_idx.count_within(i, d, self.theiler, false),
                            yz_idx.count_within(i, d, self.theiler, false),
                            z_idx.count_within(i, d, self.theiler, false),
                        )
                    } else {
                        let k_hat = joint_idx.count_within(i, 0.0, self.theiler, true);
                        if k_hat == 0 {
                            return Err(EstimatorError::DegenerateNeighborhood {
                                index: i,
                                reason: "zero k-th distance without coincident points".into(),
                            });
                        }
                        (
                            digamma(k_hat as f64),
                            xz_idx.count_within(i, 0.0, self.theiler, true),
                            yz_idx.count_within(i, 0.0, self.theiler, true),
                            z_idx.count_within(i, 0.0, self.theiler, true),
                        )
                    };
                    sum_nats += psi_k - digamma((n_xz + 1) as f64)
                        - digamma((n_yz + 1) as f64)
                        + digamma((n_z + 1) as f64);
                }
            }
        }

        let mean_nats = sum_nats / n as f64;
        if !mean_nats.is_finite() {
            return Err(EstimatorError::Numeric(format!(
                "non-finite estimate {mean_nats}"
            )));
        }
        Ok(measure.from_nats(mean_nats))
    }
}
