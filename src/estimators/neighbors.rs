// SPDX-License-Identifier: MIT OR Apache-2.0

use kiddo::traits::DistanceMetric;
use kiddo::{ImmutableKdTree, SquaredEuclidean};
use ndarray::{Array2, ArrayView1, ArrayView2};
use std::num::NonZeroUsize;

use crate::errors::{EstimatorError, Result};
use crate::estimators::dataset::Dataset;

/// Chebyshev distance metric (L-infinity norm) for kiddo.
pub struct Chebyshev;

impl<const K: usize> DistanceMetric<f64, K> for Chebyshev {
    fn dist(a: &[f64; K], b: &[f64; K]) -> f64 {
        let mut max = 0.0;
        for i in 0..K {
            let diff = (a[i] - b[i]).abs();
            if diff > max {
                max = diff;
            }
        }
        max
    }

    fn dist1(a: f64, b: f64) -> f64 {
        (a - b).abs()
    }

    // Chebyshev combines per-axis components by max, not by sum; the trait's
    // default additive accumulate would make the tree prune incorrectly.
    fn accumulate(rd: f64, delta: f64) -> f64 {
        rd.max(delta)
    }
}

/// Distance metric used by a [`NeighborIndex`]. Chebyshev for mixed and
/// conditional kNN estimators, Euclidean for distance-based measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Chebyshev,
    Euclidean,
}

/// Largest dimensionality served by the KD-tree path. Higher-dimensional
/// joint spaces fall back to brute-force scans, which stay exact but cost
/// O(N) per query.
pub const MAX_TREE_DIM: usize = 16;

fn row_to_point<const K: usize>(row: ArrayView1<'_, f64>) -> [f64; K] {
    let mut p = [0.0; K];
    for c in 0..K {
        p[c] = row[c];
    }
    p
}

fn rows_to_points<const K: usize>(data: ArrayView2<'_, f64>) -> Vec<[f64; K]> {
    let n = data.nrows();
    let mut points: Vec<[f64; K]> = Vec::with_capacity(n);
    if let Some(slice) = data.as_slice() {
        for chunk in slice.chunks_exact(K) {
            let mut p = [0.0; K];
            p.copy_from_slice(&chunk[..K]);
            points.push(p);
        }
    } else {
        for r in 0..n {
            points.push(row_to_point::<K>(data.row(r)));
        }
    }
    points
}

/// Bridges runtime dimensionality to kiddo's const-generic trees: one enum
/// variant per supported dimension, generated mechanically.
macro_rules! dyn_tree {
    ($($variant:ident => $k:literal),+ $(,)?) => {
        enum DynTree {
            $($variant(ImmutableKdTree<f64, $k>),)+
        }

        impl DynTree {
            fn build(data: ArrayView2<'_, f64>) -> Option<Self> {
                match data.ncols() {
                    $($k => Some(DynTree::$variant(ImmutableKdTree::new_from_slice(
                        &rows_to_points::<$k>(data),
                    ))),)+
                    _ => None,
                }
            }

            /// Nearest `n` entries to the query row, sorted by ascending
            /// metric distance; includes the query point itself.
            fn nearest_n(
                &self,
                query: ArrayView1<'_, f64>,
                n: usize,
                metric: Metric,
            ) -> Vec<(f64, usize)> {
                let qty = NonZeroUsize::new(n).expect("query count must be >= 1");
                match self {
                    $(DynTree::$variant(tree) => {
                        let q = row_to_point::<$k>(query);
                        match metric {
                            Metric::Chebyshev => tree
                                .nearest_n::<Chebyshev>(&q, qty)
                                .into_iter()
                                .map(|nn| (nn.distance, nn.item as usize))
                                .collect(),
                            Metric::Euclidean => tree
                                .nearest_n::<SquaredEuclidean>(&q, qty)
                                .into_iter()
                                .map(|nn| (nn.distance.sqrt(), nn.item as usize))
                                .collect(),
                        }
                    })+
                }
            }

            /// All entries within `radius` of the query row, unsorted.
            /// The query radius is padded by an epsilon so boundary ties
            /// survive the tree's own cutoff; callers filter exactly.
            fn within(
                &self,
                query: ArrayView1<'_, f64>,
                radius: f64,
                metric: Metric,
            ) -> Vec<(f64, usize)> {
                let padded = radius + radius * 1e-12 + f64::MIN_POSITIVE;
                match self {
                    $(DynTree::$variant(tree) => {
                        let q = row_to_point::<$k>(query);
                        match metric {
                            Metric::Chebyshev => tree
                                .within_unsorted::<Chebyshev>(&q, padded)
                                .into_iter()
                                .map(|nn| (nn.distance, nn.item as usize))
                                .collect(),
                            Metric::Euclidean => tree
                                .within_unsorted::<SquaredEuclidean>(&q, padded * padded)
                                .into_iter()
                                .map(|nn| (nn.distance.sqrt(), nn.item as usize))
                                .collect(),
                        }
                    })+
                }
            }
        }
    };
}

dyn_tree!(
    D1 => 1, D2 => 2, D3 => 3, D4 => 4, D5 => 5, D6 => 6, D7 => 7, D8 => 8,
    D9 => 9, D10 => 10, D11 => 11, D12 => 12, D13 => 13, D14 => 14,
    D15 => 15, D16 => 16,
);

/// Spatial index over one dataset supporting the self-query patterns the
/// estimators need: k-th neighbor distances, neighbor index lists and range
/// counts, all under a Theiler-window exclusion of temporally close samples.
pub struct NeighborIndex {
    data: Array2<f64>,
    metric: Metric,
    tree: Option<DynTree>,
}

impl NeighborIndex {
    /// Build an index over `dataset`. Dimensions above [`MAX_TREE_DIM`]
    /// get no tree and use the brute-force path.
    pub fn build(dataset: &Dataset, metric: Metric) -> Self {
        let data = dataset.view().to_owned();
        let tree = if data.nrows() > 0 {
            DynTree::build(data.view())
        } else {
            None
        };
        Self { data, metric, tree }
    }

    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    fn excluded(i: usize, j: usize, theiler: usize) -> bool {
        i.abs_diff(j) <= theiler
    }

    fn metric_distance(&self, i: usize, j: usize) -> f64 {
        let a = self.data.row(i);
        let b = self.data.row(j);
        match self.metric {
            Metric::Chebyshev => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y).abs())
                .fold(0.0, f64::max),
            Metric::Euclidean => self.squared_distance(i, j).sqrt(),
        }
    }

    /// Squared Euclidean distance between two stored points, independent of
    /// the index metric (used by the synchronization measures).
    pub fn squared_distance(&self, i: usize, j: usize) -> f64 {
        let a = self.data.row(i);
        let b = self.data.row(j);
        a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
    }

    /// Mean squared Euclidean distance from sample `i` to every sample
    /// outside its Theiler window.
    pub fn mean_squared_distance_to_all(&self, i: usize, theiler: usize) -> Result<f64> {
        let n = self.len();
        let mut sum = 0.0;
        let mut cnt = 0usize;
        for j in 0..n {
            if Self::excluded(i, j, theiler) {
                continue;
            }
            sum += self.squared_distance(i, j);
            cnt += 1;
        }
        if cnt == 0 {
            return Err(EstimatorError::DegenerateNeighborhood {
                index: i,
                reason: "no samples outside the Theiler window".into(),
            });
        }
        Ok(sum / cnt as f64)
    }

    /// The `k` nearest neighbors of sample `i` (ascending distance, with
    /// their sample indices), excluding samples within the Theiler window.
    pub fn k_nearest(&self, i: usize, k: usize, theiler: usize) -> Result<Vec<(f64, usize)>> {
        let n = self.len();
        if k < 1 {
            return Err(EstimatorError::Configuration("k must be >= 1".into()));
        }
        if let Some(tree) = &self.tree {
            // The window can swallow up to 2*theiler + 1 of the returned
            // entries, so over-request and grow if that was not enough.
            let mut request = (k + 2 * theiler + 1).min(n);
            loop {
                let raw = tree.nearest_n(self.data.row(i), request, self.metric);
                let kept: Vec<(f64, usize)> = raw
                    .into_iter()
                    .filter(|&(_, j)| !Self::excluded(i, j, theiler))
                    .take(k)
                    .collect();
                if kept.len() == k {
                    return Ok(kept);
                }
                if request == n {
                    return Err(EstimatorError::DegenerateNeighborhood {
                        index: i,
                        reason: format!(
                            "only {} neighbors available outside the Theiler window, need {k}",
                            kept.len()
                        ),
                    });
                }
                request = (request * 2).min(n);
            }
        }
        // Brute-force fallback: exact, O(N) per query.
        let mut dists: Vec<(f64, usize)> = (0..n)
            .filter(|&j| !Self::excluded(i, j, theiler))
            .map(|j| (self.metric_distance(i, j), j))
            .collect();
        if dists.len() < k {
            return Err(EstimatorError::DegenerateNeighborhood {
                index: i,
                reason: format!(
                    "only {} neighbors available outside the Theiler window, need {k}",
                    dists.len()
                ),
            });
        }
        dists.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        dists.truncate(k);
        Ok(dists)
    }

    /// Distance to the `k`-th nearest neighbor of sample `i` under the
    /// Theiler exclusion.
    pub fn kth_distance(&self, i: usize, k: usize, theiler: usize) -> Result<f64> {
        let neigh = self.k_nearest(i, k, theiler)?;
        Ok(neigh[k - 1].0)
    }

    /// Count samples within `radius` of sample `i`, excluding the Theiler
    /// window. `include_boundary` selects between `<=` and strict `<`
    /// counting, per estimator convention.
    pub fn count_within(
        &self,
        i: usize,
        radius: f64,
        theiler: usize,
        include_boundary: bool,
    ) -> usize {
        let keep = |d: f64| {
            if include_boundary {
                d <= radius
            } else {
                d < radius
            }
        };
        if let Some(tree) = &self.tree {
            return tree
                .within(self.data.row(i), radius, self.metric)
                .into_iter()
                .filter(|&(d, j)| !Self::excluded(i, j, theiler) && keep(d))
                .count();
        }
        (0..self.len())
            .filter(|&j| !Self::excluded(i, j, theiler) && keep(self.metric_distance(i, j)))
            .count()
    }
}
