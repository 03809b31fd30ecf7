// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::{EstimatorError, Result};

/// Which information quantity an estimator is asked to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureKind {
    /// I(X; Y)
    MutualInformation,
    /// I(X; Y | Z)
    ConditionalMutualInformation,
}

/// Decomposition identity used by plug-in estimators. Both identities are
/// mathematically equivalent for Shannon measures; they differ only in how
/// the probability terms are combined numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShannonIdentity {
    /// Direct KL form: sum p log(p_joint * p_z / (p_xz * p_yz)).
    #[default]
    Direct,
    /// Entropy combination: H(X,Z) + H(Y,Z) - H(X,Y,Z) - H(Z).
    EntropySum,
}

/// Identifies the computed quantity and the logarithm base of the result.
/// Orthogonal to the estimator: the same estimator type may serve several
/// measure definitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureDefinition {
    pub kind: MeasureKind,
    pub base: f64,
}

impl MeasureDefinition {
    pub fn new(kind: MeasureKind, base: f64) -> Result<Self> {
        if !base.is_finite() || base <= 1.0 {
            return Err(EstimatorError::Configuration(format!(
                "logarithm base must be finite and > 1, got {base}"
            )));
        }
        Ok(Self { kind, base })
    }

    /// Mutual information in nats.
    pub fn mi_nats() -> Self {
        Self {
            kind: MeasureKind::MutualInformation,
            base: std::f64::consts::E,
        }
    }

    /// Conditional mutual information in nats.
    pub fn cmi_nats() -> Self {
        Self {
            kind: MeasureKind::ConditionalMutualInformation,
            base: std::f64::consts::E,
        }
    }

    /// Convert a value in nats to this measure's base.
    pub fn from_nats(&self, nats: f64) -> f64 {
        nats / self.base.ln()
    }
}
