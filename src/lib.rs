// SPDX-License-Identifier: MIT OR Apache-2.0

//! # causalmeasure
//!
//! Statistical estimators for information-theoretic and causal-inference
//! quantities computed from time series: conditional mutual information,
//! transfer entropy, S/M interdependence measures, causal penchant/leaning,
//! and causal-graph discovery via Optimal Causation Entropy (OCE).
//!
//! ## Quick Start
//!
//! ```rust
//! use causalmeasure::causal::{OceConfig, discover};
//! use causalmeasure::estimators::{KnnCmiEstimator, MeasureDefinition};
//! use causalmeasure::significance::{IndependenceTest, Resampling, SurrogateKind};
//! use ndarray::Array1;
//!
//! let x: Array1<f64> = Array1::linspace(0.0, 10.0, 200).mapv(f64::sin);
//! let y = x.mapv(|v| 0.8 * v);
//! let est = KnnCmiEstimator::new(4, 0).unwrap();
//! let utest = IndependenceTest::new(
//!     MeasureDefinition::mi_nats(),
//!     est,
//!     39,
//!     Resampling::Surrogate(SurrogateKind::Shuffle),
//! ).unwrap();
//! let ctest = IndependenceTest::new(
//!     MeasureDefinition::cmi_nats(),
//!     est,
//!     39,
//!     Resampling::Surrogate(SurrogateKind::Shuffle),
//! ).unwrap();
//! let config = OceConfig::new(1, 0.05, 42).unwrap();
//! let graph = discover(&[x, y], &utest, &ctest, &config).unwrap();
//! ```
//!
//! ## Measures
//!
//! | Measure | kNN (KSG-family) | Plug-in (binned) |
//! |---------|------------------|------------------|
//! | Mutual Information | ✅ | ✅ |
//! | Conditional Mutual Information | ✅ | ✅ |
//! | Transfer Entropy | ✅ | ✅ |
//! | S-measure / M-measure | ✅ | — |
//! | Penchant / Leaning | — | ✅ |
//!
//! ## Architecture
//!
//! 1. **Sample space adapter**: [`estimators::Dataset`] aligns heterogeneous
//!    inputs into equal-length sample arrays.
//! 2. **Neighbor search backend**: KD-tree queries with Chebyshev or
//!    Euclidean metrics and a Theiler-window exclusion.
//! 3. **Estimator contract**: [`estimators::InformationEstimator`], the
//!    pluggable interface every concrete estimator implements.
//! 4. **Independence testing**: [`significance::IndependenceTest`] wraps an
//!    estimator with surrogate or local-permutation resampling.
//! 5. **Causal discovery**: [`causal::discover`] runs forward selection and
//!    backward elimination per target variable and assembles the graph.

pub mod causal;
pub mod errors;
pub mod estimators;
pub mod significance;

pub use errors::EstimatorError;
