// SPDX-License-Identifier: MIT OR Apache-2.0

//! Optimal Causation Entropy (OCE): per-target forward greedy selection of
//! time-lagged parent variables, gated by significance tests, followed by
//! backward elimination of parents made redundant by later selections.

use ndarray::{Array1, s};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::causal::graph::{CausalGraph, ParentRef, SelectedParents};
use crate::errors::{EstimatorError, Result};
use crate::estimators::dataset::Dataset;
use crate::estimators::measure::MeasureKind;
use crate::estimators::traits::InformationEstimator;
use crate::significance::IndependenceTest;

/// Search configuration, validated eagerly. `alpha` is the significance
/// level applied to every forward/backward test decision; `seed` makes the
/// resampling reproducible.
#[derive(Debug, Clone, Copy)]
pub struct OceConfig {
    pub tau_max: usize,
    pub alpha: f64,
    pub seed: u64,
}

impl OceConfig {
    pub fn new(tau_max: usize, alpha: f64, seed: u64) -> Result<Self> {
        if tau_max < 1 {
            return Err(EstimatorError::Configuration(
                "tau_max must be >= 1".into(),
            ));
        }
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(EstimatorError::Configuration(format!(
                "alpha must lie in (0, 1), got {alpha}"
            )));
        }
        Ok(Self {
            tau_max,
            alpha,
            seed,
        })
    }
}

/// Decision-point callbacks for callers that want narration (progress bars,
/// console output, audit logs). The search itself stays silent.
pub trait OceObserver {
    fn candidate_selected(&mut self, _target: usize, _parent: ParentRef, _p_value: f64) {}
    fn candidate_rejected(&mut self, _target: usize, _parent: ParentRef, _p_value: f64) {}
    fn parent_eliminated(&mut self, _target: usize, _parent: ParentRef, _p_value: f64) {}
}

/// No-op observer.
pub struct SilentObserver;

impl OceObserver for SilentObserver {}

/// Infer a directed dependency graph over all variables. Either every target
/// gets a complete parent list or the whole call fails; no partial graph.
pub fn discover<EU, EC>(
    vars: &[Array1<f64>],
    utest: &IndependenceTest<EU>,
    ctest: &IndependenceTest<EC>,
    config: &OceConfig,
) -> Result<CausalGraph>
where
    EU: InformationEstimator,
    EC: InformationEstimator,
{
    discover_with_observer(vars, utest, ctest, config, &mut SilentObserver)
}

/// [`discover`] with an observer receiving every selection decision.
pub fn discover_with_observer<EU, EC, O>(
    vars: &[Array1<f64>],
    utest: &IndependenceTest<EU>,
    ctest: &IndependenceTest<EC>,
    config: &OceConfig,
    observer: &mut O,
) -> Result<CausalGraph>
where
    EU: InformationEstimator,
    EC: InformationEstimator,
    O: OceObserver,
{
    let series = prepare_series(vars, config)?;
    check_measures(utest, ctest)?;
    let mut parent_sets = Vec::with_capacity(series.len());
    for target in 0..series.len() {
        parent_sets.push(select_parents(&series, target, utest, ctest, config, observer)?);
    }
    Ok(CausalGraph::from_parent_sets(series.len(), parent_sets))
}

/// Truncate all variables to the common minimum length and check it leaves
/// room for the lag alignment.
fn prepare_series(vars: &[Array1<f64>], config: &OceConfig) -> Result<Vec<Array1<f64>>> {
    if vars.is_empty() {
        return Err(EstimatorError::Configuration(
            "OCE requires at least one variable".into(),
        ));
    }
    let min_len = vars.iter().map(Array1::len).min().unwrap_or(0);
    if min_len <= config.tau_max {
        return Err(EstimatorError::DimensionMismatch(format!(
            "variables of length {min_len} leave no samples after aligning to tau_max {}",
            config.tau_max
        )));
    }
    Ok(vars
        .iter()
        .map(|v| v.slice(s![..min_len]).to_owned())
        .collect())
}

fn check_measures<EU, EC>(
    utest: &IndependenceTest<EU>,
    ctest: &IndependenceTest<EC>,
) -> Result<()>
where
    EU: InformationEstimator,
    EC: InformationEstimator,
{
    if utest.measure().kind != MeasureKind::MutualInformation {
        return Err(EstimatorError::Configuration(
            "pairwise test must use a mutual information measure".into(),
        ));
    }
    if ctest.measure().kind != MeasureKind::ConditionalMutualInformation {
        return Err(EstimatorError::Configuration(
            "conditional test must use a conditional mutual information measure".into(),
        ));
    }
    Ok(())
}

struct Candidate {
    parent: ParentRef,
    data: Dataset,
}

/// Forward selection and backward elimination for one target variable.
/// The accumulator is owned exclusively by this run and returned by value,
/// so per-target runs can proceed independently.
pub fn select_parents<EU, EC, O>(
    vars: &[Array1<f64>],
    target: usize,
    utest: &IndependenceTest<EU>,
    ctest: &IndependenceTest<EC>,
    config: &OceConfig,
    observer: &mut O,
) -> Result<SelectedParents>
where
    EU: InformationEstimator,
    EC: InformationEstimator,
    O: OceObserver,
{
    let target_data = Dataset::lagged_slice(&vars[target], 0, config.tau_max)?;

    // Candidate pool in var-major, lag-minor insertion order; the stable
    // ranking sort below keeps this order for tied raw measures, which makes
    // graphs reproducible for a fixed seed.
    let mut pool: Vec<Candidate> = Vec::with_capacity(vars.len() * config.tau_max);
    for var in 0..vars.len() {
        for lag in 1..=config.tau_max {
            pool.push(Candidate {
                parent: ParentRef { var, lag },
                data: Dataset::lagged_slice(&vars[var], lag, config.tau_max)?,
            });
        }
    }

    // Per-target RNG derived from the seed, independent of target order.
    let mut rng = StdRng::seed_from_u64(
        config
            .seed
            .wrapping_add((target as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)),
    );

    let mut parents: Vec<Candidate> = Vec::new();

    // Forward selection: rank remaining candidates by raw measure, then
    // significance-test them in descending order until one is accepted.
    while !pool.is_empty() {
        let conditioning = conditioning_set(&parents)?;

        let mut ranked: Vec<(usize, f64)> = Vec::with_capacity(pool.len());
        for (idx, cand) in pool.iter().enumerate() {
            let raw = match &conditioning {
                None => utest.statistic(&cand.data, &target_data, None),
                Some(cond) => ctest.statistic(&cand.data, &target_data, Some(cond)),
            };
            match raw {
                Ok(value) => ranked.push((idx, value)),
                Err(err) => {
                    // A failed raw measure disqualifies this candidate for
                    // the current round only.
                    debug!(target, var = cand.parent.var, lag = cand.parent.lag,
                           %err, "raw measure failed, skipping candidate");
                }
            }
        }
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut selected = None;
        for &(idx, raw) in ranked.iter() {
            if raw <= 0.0 {
                break;
            }
            let cand = &pool[idx];
            let result = match &conditioning {
                None => utest.run(&cand.data, &target_data, None, &mut rng)?,
                Some(cond) => ctest.run(&cand.data, &target_data, Some(cond), &mut rng)?,
            };
            if result.p_value < config.alpha {
                debug!(target, var = cand.parent.var, lag = cand.parent.lag,
                       p_value = result.p_value, "parent selected");
                observer.candidate_selected(target, cand.parent, result.p_value);
                selected = Some(idx);
                break;
            }
            observer.candidate_rejected(target, cand.parent, result.p_value);
        }

        match selected {
            Some(idx) => parents.push(pool.remove(idx)),
            None => break,
        }
    }

    // Backward elimination: drop any parent that is conditionally
    // independent of the target given the remaining parents. Restart the
    // scan after every removal; bound the passes by the initial parent count
    // to guard against oscillation.
    let initial = parents.len();
    if initial >= 2 {
        let mut passes = 0;
        while parents.len() >= 2 && passes < initial {
            passes += 1;
            let mut removed = false;
            for k in 0..parents.len() {
                let others: Vec<&Dataset> = parents
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != k)
                    .map(|(_, p)| &p.data)
                    .collect();
                let cond = Dataset::hstack(&others)?;
                let result = ctest.run(&parents[k].data, &target_data, Some(&cond), &mut rng)?;
                if result.p_value >= config.alpha {
                    debug!(target, var = parents[k].parent.var, lag = parents[k].parent.lag,
                           p_value = result.p_value, "parent eliminated");
                    observer.parent_eliminated(target, parents[k].parent, result.p_value);
                    parents.remove(k);
                    removed = true;
                    break;
                }
            }
            if !removed {
                break;
            }
        }
    }

    Ok(SelectedParents {
        target,
        parents: parents.into_iter().map(|c| c.parent).collect(),
    })
}

fn conditioning_set(parents: &[Candidate]) -> Result<Option<Dataset>> {
    if parents.is_empty() {
        return Ok(None);
    }
    let views: Vec<&Dataset> = parents.iter().map(|p| &p.data).collect();
    Ok(Some(Dataset::hstack(&views)?))
}
