// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, concatenate, s};

use crate::errors::{EstimatorError, Result};

/// Aligned sample container: an ordered, fixed-length sequence of points,
/// each point a fixed-dimension numeric vector (rows = samples, cols = dims).
///
/// All datasets participating in one estimator call must have equal length;
/// use [`Dataset::align`] to truncate heterogeneous inputs to the common
/// minimum length before estimation. Immutable once handed to an estimator.
#[derive(Debug, Clone)]
pub struct Dataset {
    data: Array2<f64>,
}

impl Dataset {
    /// Wrap a scalar sequence as an (n x 1) dataset.
    pub fn from_scalar(series: Array1<f64>) -> Self {
        let n = series.len();
        let data = series
            .into_shape_with_order((n, 1))
            .expect("reshape 1d->2d");
        Self { data }
    }

    /// Wrap an already multivariate point sequence (rows = samples).
    pub fn from_points(data: Array2<f64>) -> Self {
        Self { data }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Dimensionality of each point.
    pub fn dim(&self) -> usize {
        self.data.ncols()
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.data.row(i)
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Truncate all inputs to the common minimum length `N` by keeping the
    /// first `N` points of each. Deterministic prefix truncation, never
    /// random subsampling and never zero-padding.
    pub fn align(inputs: &[Dataset]) -> Vec<Dataset> {
        let n = inputs.iter().map(Dataset::len).min().unwrap_or(0);
        inputs
            .iter()
            .map(|d| Dataset {
                data: d.data.slice(s![..n, ..]).to_owned(),
            })
            .collect()
    }

    /// Time-delay embedding of a scalar series: row t holds
    /// `[x(t), x(t - lag), ..., x(t - (dim-1) * lag)]`, most recent first.
    ///
    /// Fails with `DimensionMismatch` when the series is shorter than the
    /// embedding span requires.
    pub fn embed(series: &Array1<f64>, dim: usize, lag: usize) -> Result<Self> {
        if dim < 1 || lag < 1 {
            return Err(EstimatorError::Configuration(format!(
                "embedding requires dim >= 1 and lag >= 1, got dim={dim}, lag={lag}"
            )));
        }
        let span = (dim - 1) * lag;
        if series.len() <= span {
            return Err(EstimatorError::DimensionMismatch(format!(
                "series of length {} too short for embedding dim={dim}, lag={lag} (span {span})",
                series.len()
            )));
        }
        let m = series.len() - span;
        let mut data = Array2::zeros((m, dim));
        for i in 0..m {
            for d in 0..dim {
                data[(i, d)] = series[i + span - d * lag];
            }
        }
        Ok(Self { data })
    }

    /// Join equal-length datasets column-wise into one joint space.
    pub fn hstack(parts: &[&Dataset]) -> Result<Self> {
        if parts.is_empty() {
            return Err(EstimatorError::Configuration(
                "hstack requires at least one dataset".into(),
            ));
        }
        let n = parts[0].len();
        for p in parts.iter() {
            if p.len() != n {
                return Err(EstimatorError::DimensionMismatch(format!(
                    "hstack length mismatch: {} vs {}",
                    p.len(),
                    n
                )));
            }
        }
        let views: Vec<ArrayView2<'_, f64>> = parts.iter().map(|p| p.data.view()).collect();
        let data = concatenate(Axis(1), &views)
            .map_err(|e| EstimatorError::DimensionMismatch(format!("hstack failed: {e}")))?;
        Ok(Self { data })
    }

    /// A lagged slice of a scalar series, aligned for a fixed maximum lag:
    /// the sample at position t of the result is `series[t + max_lag - lag]`,
    /// so all slices for `lag in 0..=max_lag` share length `n - max_lag`.
    pub fn lagged_slice(series: &Array1<f64>, lag: usize, max_lag: usize) -> Result<Self> {
        if lag > max_lag {
            return Err(EstimatorError::Configuration(format!(
                "lag {lag} exceeds max_lag {max_lag}"
            )));
        }
        let n = series.len();
        if n <= max_lag {
            return Err(EstimatorError::DimensionMismatch(format!(
                "series of length {n} too short for max_lag {max_lag}"
            )));
        }
        let start = max_lag - lag;
        let data = series.slice(s![start..n - lag]).to_owned();
        Ok(Self::from_scalar(data))
    }
}
