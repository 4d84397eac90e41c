//! Error types for the variational simulator.

use serde::Serialize;
use thiserror::Error;

/// Errors produced while configuring or running a variational simulation.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum VqsError {
    /// The configuration cannot describe a valid run. Raised before any step.
    #[error("invalid integration config: {0}")]
    InvalidIntegrationConfig(String),

    /// The geometric tensor is singular or nearly so. A regularized solution
    /// is still produced; runs attach this to the step instead of failing.
    #[error("ill-conditioned metric: {0}")]
    IllConditionedMetric(IllConditionedMetric),

    /// A produced state vector is no longer normalized.
    #[error("non-unitary state at t = {time}: norm {norm} deviates from 1")]
    NonUnitaryState {
        /// Time at which the state was produced.
        time: f64,
        /// Observed norm.
        norm: f64,
    },

    /// An operator that must be Hermitian is not.
    #[error("non-Hermitian operator at t = {time}: deviation {deviation:e}")]
    NonHermitianOperator {
        /// Time at which the operator was built or used.
        time: f64,
        /// Largest entry of `|H - H†|`, or the imaginary part of an expectation value.
        deviation: f64,
    },
}

/// Warning payload for a near-singular McLachlan metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IllConditionedMetric {
    pub time: f64,
    pub condition_number: f64,
    pub threshold: f64,
}

impl From<IllConditionedMetric> for VqsError {
    fn from(warning: IllConditionedMetric) -> Self {
        VqsError::IllConditionedMetric(warning)
    }
}

impl std::fmt::Display for IllConditionedMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "condition number {:e} exceeds {:e} at t = {}",
            self.condition_number, self.threshold, self.time
        )
    }
}

pub(crate) fn invalid_config(message: impl Into<String>) -> VqsError {
    VqsError::InvalidIntegrationConfig(message.into())
}

/// Result type for simulator operations.
pub type VqsResult<T> = Result<T, VqsError>;
