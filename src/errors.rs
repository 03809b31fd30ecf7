// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// Error taxonomy shared by estimators, the significance harness and OCE.
///
/// Configuration problems are detected eagerly at construction time; the
/// remaining variants surface at estimation time and propagate via `?`.
#[derive(Debug, Error)]
pub enum EstimatorError {
    /// Invalid hyperparameters (k = 0, tau_max = 0, alpha outside (0,1), ...).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Inputs violate a length or dimensionality contract.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Zero or duplicate k-th neighbor distance without an applicable correction,
    /// or a neighborhood too small to satisfy k under the Theiler exclusion.
    #[error("degenerate neighborhood at sample {index}: {reason}")]
    DegenerateNeighborhood { index: usize, reason: String },

    /// A resample of the independence test failed; fatal for the whole test
    /// invocation, no partial p-value is produced.
    #[error("resample {index} failed")]
    ResampleFailure {
        index: usize,
        #[source]
        source: Box<EstimatorError>,
    },

    /// Low-level numeric failure (log of a non-positive count, empty mean, ...).
    #[error("numeric failure: {0}")]
    Numeric(String),
}

pub type Result<T> = std::result::Result<T, EstimatorError>;
