// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use ndarray::{Array1, Array2};

use crate::errors::{EstimatorError, Result};
use crate::estimators::approaches::binning::encode_columns;
use crate::estimators::dataset::Dataset;
use crate::estimators::measure::{MeasureDefinition, MeasureKind, ShannonIdentity};
use crate::estimators::traits::InformationEstimator;

/// Plug-in (histogram) MI/CMI estimator over uniformly discretized data.
///
/// Each input is binned per column and its rows reduced to compact joint
/// codes; probabilities are empirical frequencies. The Shannon measure is
/// computed either in the direct KL form or through the entropy-sum identity
/// (both equivalent, selectable via [`ShannonIdentity`]).
///
/// Plug-in Shannon MI/CMI is non-negative; the result is clamped at zero so
/// float dust cannot leak a negative estimate.
#[derive(Debug, Clone, Copy)]
pub struct PluginCmiEstimator {
    bins: usize,
    identity: ShannonIdentity,
}

impl PluginCmiEstimator {
    pub fn new(bins: usize, identity: ShannonIdentity) -> Result<Self> {
        if bins < 1 {
            return Err(EstimatorError::Configuration(
                "plug-in estimator requires at least one bin".into(),
            ));
        }
        Ok(Self { bins, identity })
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Reduce a (samples x dims) code array to one compact code per row,
    /// first-occurrence order for determinism.
    fn compact_codes(codes: &Array2<i32>) -> Array1<i32> {
        let mut map: HashMap<Vec<i32>, i32> = HashMap::new();
        let mut next_id: i32 = 0;
        let mut out: Vec<i32> = Vec::with_capacity(codes.nrows());
        for row in codes.rows() {
            let key: Vec<i32> = row.iter().copied().collect();
            let id = *map.entry(key).or_insert_with(|| {
                let v = next_id;
                next_id += 1;
                v
            });
            out.push(id);
        }
        Array1::from(out)
    }

    fn codes_for(&self, dataset: &Dataset) -> Result<Array1<i32>> {
        let binned = encode_columns(dataset, self.bins)?;
        Ok(Self::compact_codes(&binned))
    }
}

fn entropy_nats<'a>(counts: impl Iterator<Item = &'a usize>, n: f64) -> f64 {
    let mut h = 0.0;
    for &cnt in counts {
        let p = cnt as f64 / n;
        if p > 0.0 {
            h -= p * p.ln();
        }
    }
    h
}

fn count_map<K: std::hash::Hash + Eq>(keys: impl Iterator<Item = K>) -> HashMap<K, usize> {
    let mut map = HashMap::new();
    for k in keys {
        *map.entry(k).or_insert(0) += 1;
    }
    map
}

impl InformationEstimator for PluginCmiEstimator {
    fn estimate(
        &self,
        measure: &MeasureDefinition,
        x: &Dataset,
        y: &Dataset,
        z: Option<&Dataset>,
    ) -> Result<f64> {
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
        if n == 0 {
            return Err(EstimatorError::DimensionMismatch(
                "cannot estimate from zero samples".into(),
            ));
        }
        if y.len() != n || z.map(|d| d.len() != n).unwrap_or(false) {
            return Err(EstimatorError::DimensionMismatch(format!(
                "input lengths differ: x={}, y={}, z={:?}",
                n,
                y.len(),
                z.map(Dataset::len)
            )));
        }

        let cx = self.codes_for(x)?;
        let cy = self.codes_for(y)?;
        let n_f = n as f64;

        let nats = match z {
            None => {
                let joint = count_map((0..n).map(|i| (cx[i], cy[i])));
                let mx = count_map(cx.iter().copied());
                let my = count_map(cy.iter().copied());
                match self.identity {
                    ShannonIdentity::Direct => {
                        let mut s = 0.0;
                        for (&(a, b), &n_ab) in joint.iter() {
                            let p = n_ab as f64 / n_f;
                            s += p * ((n_ab as f64 * n_f) / (mx[&a] as f64 * my[&b] as f64)).ln();
                        }
                        s
                    }
                    ShannonIdentity::EntropySum => {
                        entropy_nats(mx.values(), n_f) + entropy_nats(my.values(), n_f)
                            - entropy_nats(joint.values(), n_f)
                    }
                }
            }
            Some(z) => {
                let cz = self.codes_for(z)?;
                let joint = count_map((0..n).map(|i| (cx[i], cy[i], cz[i])));
                let xz = count_map((0..n).map(|i| (cx[i], cz[i])));
                let yz = count_map((0..n).map(|i| (cy[i], cz[i])));
                let mz = count_map(cz.iter().copied());
                match self.identity {
                    ShannonIdentity::Direct => {
                        let mut s = 0.0;
                        for (&(a, b, c), &n_abc) in joint.iter() {
                            let p = n_abc as f64 / n_f;
                            let num = n_abc as f64 * mz[&c] as f64;
                            let den = xz[&(a, c)] as f64 * yz[&(b, c)] as f64;
                            s += p * (num / den).ln();
                        }
                        s
                    }
                    ShannonIdentity::EntropySum => {
                        entropy_nats(xz.values(), n_f) + entropy_nats(yz.values(), n_f)
                            - entropy_nats(joint.values(), n_f)
                            - entropy_nats(mz.values(), n_f)
                    }
                }
            }
        };

        if !nats.is_finite() {
            return Err(EstimatorError::Numeric(format!("non-finite estimate {nats}")));
        }
        Ok(measure.from_nats(nats).max(0.0))
    }
}
