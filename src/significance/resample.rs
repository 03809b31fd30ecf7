// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::Array2;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::errors::{EstimatorError, Result};
use crate::estimators::dataset::Dataset;
use crate::estimators::neighbors::{Metric, NeighborIndex};

fn rows_in_order(dataset: &Dataset, order: &[usize]) -> Dataset {
    let view = dataset.view();
    let mut out = Array2::zeros((order.len(), view.ncols()));
    for (r, &src) in order.iter().enumerate() {
        out.row_mut(r).assign(&view.row(src));
    }
    Dataset::from_points(out)
}

/// Full random permutation of the sample order; destroys all temporal and
/// cross-variable structure of the permuted variable.
pub fn shuffle_rows<R: Rng>(dataset: &Dataset, rng: &mut R) -> Dataset {
    let mut order: Vec<usize> = (0..dataset.len()).collect();
    order.shuffle(rng);
    rows_in_order(dataset, &order)
}

/// Circular shift by a random non-zero offset; preserves the autocorrelation
/// of the shifted variable while breaking its alignment with the others.
pub fn circular_shift<R: Rng>(dataset: &Dataset, rng: &mut R) -> Dataset {
    let n = dataset.len();
    if n < 2 {
        return dataset.clone();
    }
    let offset = rng.gen_range(1..n);
    let order: Vec<usize> = (0..n).map(|i| (i + offset) % n).collect();
    rows_in_order(dataset, &order)
}

/// Permute `y` within neighborhoods of the conditioning variable `z`:
/// each sample swaps its y-row with one of its `neighbors` nearest z-space
/// neighbors, preferring unused partners so the map stays close to a
/// permutation. Preserves the y-z relationship while destroying the x-y
/// association conditional on z.
pub fn local_permutation<R: Rng>(
    y: &Dataset,
    z: &Dataset,
    neighbors: usize,
    rng: &mut R,
) -> Result<Dataset> {
    let n = y.len();
    if z.len() != n {
        return Err(EstimatorError::DimensionMismatch(format!(
            "local permutation: y length {} != z length {}",
            n,
            z.len()
        )));
    }
    if n < 2 {
        return Err(EstimatorError::DimensionMismatch(
            "local permutation needs at least two samples".into(),
        ));
    }
    let k = neighbors.min(n - 1);
    let z_idx = NeighborIndex::build(z, Metric::Chebyshev);

    let mut visit: Vec<usize> = (0..n).collect();
    visit.shuffle(rng);

    let mut used = vec![false; n];
    let mut order = vec![0usize; n];
    for &i in visit.iter() {
        let mut picks: Vec<usize> = z_idx
            .k_nearest(i, k, 0)?
            .into_iter()
            .map(|(_, j)| j)
            .collect();
        picks.shuffle(rng);
        let j = picks
            .iter()
            .copied()
            .find(|&j| !used[j])
            .unwrap_or(picks[0]);
        used[j] = true;
        order[i] = j;
    }
    Ok(rows_in_order(y, &order))
}
