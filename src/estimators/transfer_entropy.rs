// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::{Array1, Array2};

use crate::errors::{EstimatorError, Result};
use crate::estimators::dataset::Dataset;
use crate::estimators::measure::{MeasureDefinition, MeasureKind};
use crate::estimators::traits::InformationEstimator;

/// History configuration for transfer entropy.
#[derive(Debug, Clone, Copy)]
pub struct TeConfig {
    /// Number of past source observations (l).
    pub src_hist: usize,
    /// Number of past destination observations (k).
    pub dest_hist: usize,
    /// Delay between consecutive history observations.
    pub step: usize,
}

impl TeConfig {
    pub fn new(src_hist: usize, dest_hist: usize, step: usize) -> Result<Self> {
        if src_hist < 1 || dest_hist < 1 || step < 1 {
            return Err(EstimatorError::Configuration(format!(
                "transfer entropy requires src_hist, dest_hist and step >= 1, \
                 got {src_hist}, {dest_hist}, {step}"
            )));
        }
        Ok(Self {
            src_hist,
            dest_hist,
            step,
        })
    }
}

/// Slice source/destination series into aligned future and history blocks:
/// (dest_future, dest_history, src_history), rows indexed by prediction time.
fn te_slices(
    source: &Array1<f64>,
    destination: &Array1<f64>,
    cfg: &TeConfig,
) -> Result<(Dataset, Dataset, Dataset)> {
    if source.len() != destination.len() {
        return Err(EstimatorError::DimensionMismatch(format!(
            "source length {} != destination length {}",
            source.len(),
            destination.len()
        )));
    }
    let max_delay = cfg.src_hist.max(cfg.dest_hist) * cfg.step;
    let n = destination.len();
    if max_delay >= n {
        return Err(EstimatorError::DimensionMismatch(format!(
            "series of length {n} too short for history span {max_delay}"
        )));
    }

    let base_indices: Vec<usize> = (max_delay..n).step_by(cfg.step).collect();
    let n_samples = base_indices.len();

    let mut dest_future = Array2::zeros((n_samples, 1));
    let mut dest_history = Array2::zeros((n_samples, cfg.dest_hist));
    let mut src_history = Array2::zeros((n_samples, cfg.src_hist));

    for (idx, &base_idx) in base_indices.iter().enumerate() {
        dest_future[(idx, 0)] = destination[base_idx];
        for j in 0..cfg.dest_hist {
            let offset = (j + 1) * cfg.step;
            dest_history[(idx, cfg.dest_hist - 1 - j)] = destination[base_idx - offset];
        }
        for j in 0..cfg.src_hist {
            let offset = (j + 1) * cfg.step;
            src_history[(idx, cfg.src_hist - 1 - j)] = source[base_idx - offset];
        }
    }

    Ok((
        Dataset::from_points(dest_future),
        Dataset::from_points(dest_history),
        Dataset::from_points(src_history),
    ))
}

/// Transfer entropy `TE(source -> destination)` expressed through the CMI
/// contract: `I(src_history ; dest_future | dest_history)`. Any conforming
/// [`InformationEstimator`] plugs in.
pub fn transfer_entropy<E: InformationEstimator>(
    estimator: &E,
    base: f64,
    source: &Array1<f64>,
    destination: &Array1<f64>,
    cfg: &TeConfig,
) -> Result<f64> {
    let measure = MeasureDefinition::new(MeasureKind::ConditionalMutualInformation, base)?;
    let (dest_future, dest_history, src_history) = te_slices(source, destination, cfg)?;
    estimator.estimate(&measure, &src_history, &dest_future, Some(&dest_history))
}

/// Conditional transfer entropy `TE(source -> destination | condition)`:
/// the conditioning set joins the destination history with `cond_hist` lags
/// of the extra condition series.
pub fn conditional_transfer_entropy<E: InformationEstimator>(
    estimator: &E,
    base: f64,
    source: &Array1<f64>,
    destination: &Array1<f64>,
    condition: &Array1<f64>,
    cfg: &TeConfig,
    cond_hist: usize,
) -> Result<f64> {
    if cond_hist < 1 {
        return Err(EstimatorError::Configuration(
            "conditional transfer entropy requires cond_hist >= 1".into(),
        ));
    }
    if condition.len() != destination.len() {
        return Err(EstimatorError::DimensionMismatch(format!(
            "condition length {} != destination length {}",
            condition.len(),
            destination.len()
        )));
    }
    // The slicing must use one common span so all blocks stay aligned.
    let span_cfg = TeConfig::new(
        cfg.src_hist,
        cfg.dest_hist.max(cond_hist),
        cfg.step,
    )?;
    let measure = MeasureDefinition::new(MeasureKind::ConditionalMutualInformation, base)?;
    let (dest_future, dest_history_wide, src_history) = te_slices(source, destination, &span_cfg)?;
    let (_, cond_history, _) = te_slices(source, condition, &span_cfg)?;
    // Keep only the requested number of destination history columns (the
    // widened slicing may carry extra leading lags).
    let dest_history = trim_history(&dest_history_wide, cfg.dest_hist);
    let cond_history = trim_history(&cond_history, cond_hist);
    let conditioning = Dataset::hstack(&[&dest_history, &cond_history])?;
    estimator.estimate(&measure, &src_history, &dest_future, Some(&conditioning))
}

/// Keep the most recent `hist` columns of a history block (columns are
/// ordered oldest to newest).
fn trim_history(history: &Dataset, hist: usize) -> Dataset {
    let view = view_last_columns(history, hist);
    Dataset::from_points(view)
}

fn view_last_columns(dataset: &Dataset, cols: usize) -> Array2<f64> {
    let view = dataset.view();
    let start = view.ncols().saturating_sub(cols);
    view.slice(ndarray::s![.., start..]).to_owned()
}
