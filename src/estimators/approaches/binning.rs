// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::Array2;

use crate::errors::{EstimatorError, Result};
use crate::estimators::dataset::Dataset;

/// Deterministic uniform-width discretization of one column of samples.
///
/// Encoding maps a value to its bin index; decoding maps a bin index back to
/// the bin center. Re-encoding a decoded center always recovers the same bin,
/// so discretization is idempotent per bin.
#[derive(Debug, Clone, Copy)]
pub struct UniformBinning {
    bins: usize,
    lo: f64,
    width: f64,
}

impl UniformBinning {
    /// Fit a binning to the observed value range of a slice of samples.
    pub fn fit(values: impl Iterator<Item = f64> + Clone, bins: usize) -> Result<Self> {
        if bins < 1 {
            return Err(EstimatorError::Configuration(
                "binning requires at least one bin".into(),
            ));
        }
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        let mut any = false;
        for v in values {
            if !v.is_finite() {
                return Err(EstimatorError::Numeric(format!(
                    "cannot bin non-finite value {v}"
                )));
            }
            lo = lo.min(v);
            hi = hi.max(v);
            any = true;
        }
        if !any {
            return Err(EstimatorError::DimensionMismatch(
                "cannot fit a binning to an empty sequence".into(),
            ));
        }
        // A constant column still gets one well-defined bin.
        let width = if hi > lo { (hi - lo) / bins as f64 } else { 1.0 };
        Ok(Self { bins, lo, width })
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Bin index of a value; values at or beyond the fitted range clamp to
    /// the edge bins.
    pub fn encode(&self, value: f64) -> usize {
        let raw = ((value - self.lo) / self.width).floor();
        if raw < 0.0 {
            0
        } else {
            (raw as usize).min(self.bins - 1)
        }
    }

    /// Representative center of a bin.
    pub fn bin_center(&self, bin: usize) -> f64 {
        self.lo + (bin as f64 + 0.5) * self.width
    }
}

/// Discretize every column of a dataset independently, returning per-sample
/// bin indices (same shape as the input).
pub fn encode_columns(dataset: &Dataset, bins: usize) -> Result<Array2<i32>> {
    let view = dataset.view();
    let mut out = Array2::zeros((view.nrows(), view.ncols()));
    for c in 0..view.ncols() {
        let col = view.column(c);
        let binning = UniformBinning::fit(col.iter().copied(), bins)?;
        for r in 0..view.nrows() {
            out[(r, c)] = binning.encode(col[r]) as i32;
        }
    }
    Ok(out)
}
