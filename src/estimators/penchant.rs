// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use crate::errors::{EstimatorError, Result};
use crate::estimators::approaches::binning::UniformBinning;
use crate::estimators::dataset::Dataset;

/// Configuration for penchant/leaning: the cause-to-effect lag and the
/// number of uniform bins used to discretize both series.
#[derive(Debug, Clone, Copy)]
pub struct LeaningConfig {
    pub lag: usize,
    pub bins: usize,
}

impl LeaningConfig {
    pub fn new(lag: usize, bins: usize) -> Result<Self> {
        if lag < 1 {
            return Err(EstimatorError::Configuration("lag must be >= 1".into()));
        }
        if bins < 2 {
            return Err(EstimatorError::Configuration(
                "leaning requires at least two bins".into(),
            ));
        }
        Ok(Self { lag, bins })
    }
}

fn scalar_codes(dataset: &Dataset, bins: usize) -> Result<Vec<usize>> {
    if dataset.dim() != 1 {
        return Err(EstimatorError::DimensionMismatch(format!(
            "penchant/leaning accept scalar sequences only, got dimension {}",
            dataset.dim()
        )));
    }
    let col = dataset.view().column(0).to_owned();
    let binning = UniformBinning::fit(col.iter().copied(), bins)?;
    Ok(col.iter().map(|&v| binning.encode(v)).collect())
}

/// Observation-weighted mean causal penchant of `cause` driving `effect`
/// at the configured lag (McCracken-Weigel).
///
/// For each observed (effect, cause) assignment the penchant is
/// `rho = P(e|c) - P(e|~c)` with the complement conditional derived from the
/// joint counts; when the cause takes a single value the unconditioned
/// `P(e|c) - P(e)` is used instead. Positive mean penchant favors the
/// cause-to-effect direction.
pub fn mean_penchant(cause: &Dataset, effect: &Dataset, cfg: &LeaningConfig) -> Result<f64> {
    let n = cause.len();
    if effect.len() != n {
        return Err(EstimatorError::DimensionMismatch(format!(
            "input lengths differ: cause={}, effect={}",
            n,
            effect.len()
        )));
    }
    if n <= cfg.lag {
        return Err(EstimatorError::DimensionMismatch(format!(
            "series of length {n} too short for lag {}",
            cfg.lag
        )));
    }
    let c_codes = scalar_codes(cause, cfg.bins)?;
    let e_codes = scalar_codes(effect, cfg.bins)?;

    let m = n - cfg.lag;
    let mut n_c: HashMap<usize, usize> = HashMap::new();
    let mut n_e: HashMap<usize, usize> = HashMap::new();
    let mut n_ec: HashMap<(usize, usize), usize> = HashMap::new();
    for t in cfg.lag..n {
        let c = c_codes[t - cfg.lag];
        let e = e_codes[t];
        *n_c.entry(c).or_insert(0) += 1;
        *n_e.entry(e).or_insert(0) += 1;
        *n_ec.entry((e, c)).or_insert(0) += 1;
    }

    let m_f = m as f64;
    let mut sum = 0.0;
    for t in cfg.lag..n {
        let c = c_codes[t - cfg.lag];
        let e = e_codes[t];
        let nc = n_c[&c];
        let ne = n_e[&e];
        let nec = n_ec[&(e, c)];
        let p_e_given_c = nec as f64 / nc as f64;
        let rho = if nc < m {
            let p_e_given_not_c = (ne - nec) as f64 / (m - nc) as f64;
            p_e_given_c - p_e_given_not_c
        } else {
            p_e_given_c - ne as f64 / m_f
        };
        sum += rho;
    }
    Ok(sum / m_f)
}

/// Causal leaning `lambda(x -> y)`: the mean penchant of x driving y minus
/// the mean penchant of y driving x, both at the configured lag. Positive
/// values lean toward x as the driver.
pub fn leaning(x: &Dataset, y: &Dataset, cfg: &LeaningConfig) -> Result<f64> {
    Ok(mean_penchant(x, y, cfg)? - mean_penchant(y, x, cfg)?)
}
