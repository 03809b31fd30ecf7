// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod approaches;
pub mod dataset;
pub mod measure;
pub mod neighbors;
pub mod penchant;
pub mod synchrony;
pub mod traits;
pub mod transfer_entropy;

pub use approaches::{KnnCmiEstimator, PluginCmiEstimator, UniformBinning};
pub use dataset::Dataset;
pub use measure::{MeasureDefinition, MeasureKind, ShannonIdentity};
pub use traits::InformationEstimator;
