// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod binning;
pub mod knn;
pub mod plugin;

pub use binning::UniformBinning;
pub use knn::KnnCmiEstimator;
pub use plugin::PluginCmiEstimator;
