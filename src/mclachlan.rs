//! McLachlan's variational principle.
//!
//! Minimizing `‖ Σ_k ∂_kψ·θ̇_k + iH|ψ> ‖` over `θ̇` gives the linear system
//!
//! ```text
//! M · θ̇ = V,   M[j,k] = Re<∂_jψ|∂_kψ>,   V[k] = Im<∂_kψ|H|ψ>
//! ```
//!
//! `M` is the real part of the quantum geometric tensor. It is singular
//! whenever two parameters move the state along the same direction, so the
//! system is solved with a Tikhonov-regularized pseudo-inverse on the
//! eigendecomposition of `M`:
//!
//! ```text
//! θ̇ = Σ_i v_i · λ_i / (λ_i² + α) · (v_iᵀ V)
//! ```

use nalgebra::{DMatrix, DVector};
use tracing::trace;

use crate::ansatz::Ansatz;
use crate::error::{invalid_config, IllConditionedMetric, VqsResult};
use crate::hamiltonian::TimeDependentHamiltonian;
use crate::qstate::QState;
use crate::Qbit;

/// Default Tikhonov parameter `α`.
pub const DEFAULT_REGULARIZATION: f64 = 1e-8;

/// Condition number above which a step is flagged as ill-conditioned.
pub const DEFAULT_CONDITION_THRESHOLD: f64 = 1e6;

/// Parameter velocity together with the system it was solved from.
#[derive(Clone, Debug)]
pub struct Velocity {
    pub theta_dot: DVector<f64>,
    pub metric: DMatrix<f64>,
    pub force: DVector<f64>,
    /// `|λ|max / |λ|min` of the metric, infinite when singular.
    pub condition_number: f64,
    pub warning: Option<IllConditionedMetric>,
}

impl Velocity {
    /// Turns a conditioning warning into
    /// [`VqsError::IllConditionedMetric`](crate::error::VqsError::IllConditionedMetric),
    /// for callers that refuse regularized solutions.
    pub fn into_result(self) -> VqsResult<Self> {
        match self.warning {
            Some(warning) => Err(warning.into()),
            None => Ok(self),
        }
    }
}

/// `M[j,k] = Re<∂_jψ|∂_kψ>`
pub fn metric_tensor(derivatives: &[DVector<Qbit>]) -> DMatrix<f64> {
    let n = derivatives.len();
    let mut metric = DMatrix::zeros(n, n);
    for j in 0..n {
        for k in j..n {
            let value = derivatives[j].dotc(&derivatives[k]).re;
            metric[(j, k)] = value;
            metric[(k, j)] = value;
        }
    }
    metric
}

/// `V[k] = Im<∂_kψ|H|ψ>`
pub fn force_vector(
    derivatives: &[DVector<Qbit>],
    hamiltonian: &DMatrix<Qbit>,
    psi: &QState,
) -> DVector<f64> {
    let h_psi = hamiltonian * psi.amplitudes();
    DVector::from_iterator(
        derivatives.len(),
        derivatives.iter().map(|d| d.dotc(&h_psi).im),
    )
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct McLachlanSolver {
    regularization: f64,
    condition_threshold: f64,
}

impl Default for McLachlanSolver {
    fn default() -> Self {
        Self {
            regularization: DEFAULT_REGULARIZATION,
            condition_threshold: DEFAULT_CONDITION_THRESHOLD,
        }
    }
}

impl McLachlanSolver {
    pub fn new(regularization: f64, condition_threshold: f64) -> VqsResult<Self> {
        if !regularization.is_finite() || regularization < 0.0 {
            return Err(invalid_config(format!(
                "regularization must be finite and non-negative, got {}",
                regularization
            )));
        }
        if condition_threshold.is_nan() || condition_threshold <= 0.0 {
            return Err(invalid_config(format!(
                "condition threshold must be positive, got {}",
                condition_threshold
            )));
        }
        Ok(Self {
            regularization,
            condition_threshold,
        })
    }

    pub fn regularization(&self) -> f64 {
        self.regularization
    }

    pub fn condition_threshold(&self) -> f64 {
        self.condition_threshold
    }

    /// `θ̇` at `(θ, t)`. Pure: identical inputs give identical outputs.
    pub fn solve(
        &self,
        ansatz: &Ansatz,
        hamiltonian: &TimeDependentHamiltonian,
        theta: &[f64],
        t: f64,
    ) -> VqsResult<Velocity> {
        let psi = ansatz.state_at(theta)?;
        psi.check_normalized(t)?;
        let derivatives = ansatz.derivatives_at(theta)?;

        let metric = metric_tensor(&derivatives);
        let force = force_vector(&derivatives, &hamiltonian.hamiltonian_at(t), &psi);

        Ok(self.solve_system(metric, force, t))
    }

    /// Regularized solve of `M·θ̇ = V`. Never fails: an ill-conditioned
    /// metric yields the best-effort solution plus a warning.
    pub fn solve_system(&self, metric: DMatrix<f64>, force: DVector<f64>, t: f64) -> Velocity {
        let n = force.len();
        if n == 0 {
            return Velocity {
                theta_dot: DVector::zeros(0),
                metric,
                force,
                condition_number: 1.0,
                warning: None,
            };
        }

        let eigen = metric.clone().symmetric_eigen();
        let largest = eigen.eigenvalues.iter().map(|l| l.abs()).fold(0.0, f64::max);
        let smallest = eigen
            .eigenvalues
            .iter()
            .map(|l| l.abs())
            .fold(f64::INFINITY, f64::min);
        let condition_number = if smallest > 0.0 {
            largest / smallest
        } else {
            f64::INFINITY
        };

        let projected = eigen.eigenvectors.transpose() * &force;
        let scaled = DVector::from_iterator(
            n,
            projected
                .iter()
                .zip(eigen.eigenvalues.iter())
                .map(|(&p, &lambda)| {
                    let denominator = lambda * lambda + self.regularization;
                    if denominator > 0.0 {
                        p * lambda / denominator
                    } else {
                        0.0
                    }
                }),
        );
        let theta_dot = &eigen.eigenvectors * scaled;

        let warning = (condition_number > self.condition_threshold).then_some(IllConditionedMetric {
            time: t,
            condition_number,
            threshold: self.condition_threshold,
        });

        trace!(t, condition_number, "solved McLachlan system");

        Velocity {
            theta_dot,
            metric,
            force,
            condition_number,
            warning,
        }
    }
}
