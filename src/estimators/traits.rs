// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::Result;
use crate::estimators::dataset::Dataset;
use crate::estimators::measure::MeasureDefinition;

/// Contract every concrete information-measure estimator implements.
///
/// - `x`, `y` and the optional conditioning variable `z` are datasets of
///   equal length, already time-aligned; estimators perform no further lag
///   alignment.
/// - The returned value is expressed in the logarithm base of `measure`.
///   Neighbor-based (KSG-family) estimates may be slightly negative near
///   independence; plug-in estimates over discretized data are `>= 0`.
/// - Estimators are deterministic given identical inputs and configuration.
///   The significance harness relies on this to attribute all variation in
///   the null distribution to the resampling.
/// - Estimators restricted to scalar sequences reject multivariate input
///   with `DimensionMismatch` rather than coercing.
pub trait InformationEstimator {
    fn estimate(
        &self,
        measure: &MeasureDefinition,
        x: &Dataset,
        y: &Dataset,
        z: Option<&Dataset>,
    ) -> Result<f64>;
}

impl<E: InformationEstimator + ?Sized> InformationEstimator for &E {
    fn estimate(
        &self,
        measure: &MeasureDefinition,
        x: &Dataset,
        y: &Dataset,
        z: Option<&Dataset>,
    ) -> Result<f64> {
        (**self).estimate(measure, x, y, z)
    }
}
