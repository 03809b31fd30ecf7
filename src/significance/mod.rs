// SPDX-License-Identifier: MIT OR Apache-2.0

//! Independence testing: wraps a raw estimator with a resampling scheme to
//! produce a p-value against the null hypothesis of (conditional)
//! independence.

pub mod resample;

use rand::Rng;
use tracing::trace;

use crate::errors::{EstimatorError, Result};
use crate::estimators::dataset::Dataset;
use crate::estimators::measure::MeasureDefinition;
use crate::estimators::traits::InformationEstimator;

/// Independence-preserving surrogate transforms applied to `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurrogateKind {
    /// Random permutation of the sample order.
    Shuffle,
    /// Circular shift by a random offset (keeps autocorrelation).
    CircularShift,
}

/// Resampling strategy generating the null distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resampling {
    /// Replace `x` by a surrogate and recompute the full estimator.
    Surrogate(SurrogateKind),
    /// Permute `y` within neighborhoods of the conditioning variable `z`
    /// (conditional tests only).
    LocalPermutation { neighbors: usize },
}

/// Outcome of one test invocation: the observed statistic, the null sample
/// and the derived one-sided upper-tail p-value. The significance level is
/// applied by the caller, not stored here.
#[derive(Debug, Clone)]
pub struct IndependenceTestResult {
    pub statistic: f64,
    pub null_distribution: Vec<f64>,
    pub p_value: f64,
}

impl IndependenceTestResult {
    /// Reject the independence null at level `alpha`.
    pub fn rejects(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Pairs a measure and estimator with a resampling strategy.
///
/// The estimator must be deterministic (see [`InformationEstimator`]); the
/// harness never mutates the estimator or measure, and any estimator failure
/// during the resample loop aborts the whole invocation — no partial p-value
/// is ever returned.
#[derive(Debug, Clone)]
pub struct IndependenceTest<E> {
    measure: MeasureDefinition,
    estimator: E,
    resamples: usize,
    resampling: Resampling,
}

impl<E: InformationEstimator> IndependenceTest<E> {
    pub fn new(
        measure: MeasureDefinition,
        estimator: E,
        resamples: usize,
        resampling: Resampling,
    ) -> Result<Self> {
        if let Resampling::LocalPermutation { neighbors } = resampling {
            if neighbors < 1 {
                return Err(EstimatorError::Configuration(
                    "local permutation requires at least one neighbor".into(),
                ));
            }
        }
        Ok(Self {
            measure,
            estimator,
            resamples,
            resampling,
        })
    }

    pub fn measure(&self) -> &MeasureDefinition {
        &self.measure
    }

    /// Raw (untested) point estimate on the real data. Used by OCE to rank
    /// candidates before paying for a full significance test.
    pub fn statistic(&self, x: &Dataset, y: &Dataset, z: Option<&Dataset>) -> Result<f64> {
        self.estimator.estimate(&self.measure, x, y, z)
    }

    /// Run the full test: observed statistic, `R` resampled statistics and
    /// the p-value `(1 + #{null >= observed}) / (R + 1)`, which is never
    /// exactly zero. The p-value aggregation is a reduction over the full
    /// null vector, so it does not depend on resample completion order.
    pub fn run<R: Rng>(
        &self,
        x: &Dataset,
        y: &Dataset,
        z: Option<&Dataset>,
        rng: &mut R,
    ) -> Result<IndependenceTestResult> {
        let statistic = self.estimator.estimate(&self.measure, x, y, z)?;

        let mut null_distribution = Vec::with_capacity(self.resamples);
        for index in 0..self.resamples {
            let value = self
                .resampled_statistic(x, y, z, rng)
                .map_err(|source| EstimatorError::ResampleFailure {
                    index,
                    source: Box::new(source),
                })?;
            null_distribution.push(value);
        }

        let exceeding = null_distribution.iter().filter(|&&v| v >= statistic).count();
        let p_value = (1 + exceeding) as f64 / (self.resamples + 1) as f64;
        trace!(statistic, p_value, resamples = self.resamples, "independence test");

        Ok(IndependenceTestResult {
            statistic,
            null_distribution,
            p_value,
        })
    }

    fn resampled_statistic<R: Rng>(
        &self,
        x: &Dataset,
        y: &Dataset,
        z: Option<&Dataset>,
        rng: &mut R,
    ) -> Result<f64> {
        match self.resampling {
            Resampling::Surrogate(kind) => {
                let x_s = match kind {
                    SurrogateKind::Shuffle => resample::shuffle_rows(x, rng),
                    SurrogateKind::CircularShift => resample::circular_shift(x, rng),
                };
                self.estimator.estimate(&self.measure, &x_s, y, z)
            }
            Resampling::LocalPermutation { neighbors } => {
                let z = z.ok_or_else(|| {
                    EstimatorError::Configuration(
                        "local permutation requires a conditioning variable".into(),
                    )
                })?;
                let y_s = resample::local_permutation(y, z, neighbors, rng)?;
                self.estimator.estimate(&self.measure, x, &y_s, Some(z))
            }
        }
    }
}
