use serde::Serialize;

use crate::error::{invalid_config, IllConditionedMetric, VqsResult};
use crate::integrator::ParameterStep;
use crate::observable::{Observable, Pauli};
use crate::qstate::QState;

/// `|<a|b>|²`, clipped to `[0, 1]` against round-off overshoot.
pub fn fidelity(a: &QState, b: &QState) -> f64 {
    a.inner(b).norm_sqr().clamp(0.0, 1.0)
}

/// `(<X>, <Y>, <Z>)` of one qubit.
pub fn bloch_vector(state: &QState, qubit: usize) -> VqsResult<[f64; 3]> {
    let component =
        |kind: Pauli| Observable::single(kind, qubit).expectation_value(state);
    Ok([
        component(Pauli::X)?,
        component(Pauli::Y)?,
        component(Pauli::Z)?,
    ])
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrajectoryPoint {
    pub time: f64,
    pub theta: Vec<f64>,
    pub fidelity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<IllConditionedMetric>,
}

/// Ordered `(time, θ, fidelity)` points of one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TrajectoryRecord {
    points: Vec<TrajectoryPoint>,
}

impl TrajectoryRecord {
    /// Pairs every parameter snapshot with its variational and exact state.
    pub fn evaluate(
        steps: &[ParameterStep],
        variational: &[QState],
        exact: &[QState],
    ) -> VqsResult<Self> {
        if steps.len() != variational.len() || steps.len() != exact.len() {
            return Err(invalid_config(format!(
                "trajectory lengths differ: {} parameter snapshots, {} variational states, {} exact states",
                steps.len(),
                variational.len(),
                exact.len()
            )));
        }

        let points = steps
            .iter()
            .zip(variational.iter().zip(exact))
            .map(|(step, (psi_var, psi_exact))| TrajectoryPoint {
                time: step.time,
                theta: step.theta.clone(),
                fidelity: fidelity(psi_var, psi_exact),
                warning: step.warning,
            })
            .collect();

        Ok(Self { points })
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&TrajectoryPoint> {
        self.points.last()
    }

    pub fn times(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.time).collect()
    }

    pub fn fidelities(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.fidelity).collect()
    }

    /// One row of `θ` per recorded time.
    pub fn parameter_history(&self) -> Vec<Vec<f64>> {
        self.points.iter().map(|p| p.theta.clone()).collect()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &IllConditionedMetric> {
        self.points.iter().filter_map(|p| p.warning.as_ref())
    }

    pub fn mean_fidelity(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.points.iter().map(|p| p.fidelity).sum::<f64>() / self.points.len() as f64)
    }

    pub fn min_fidelity(&self) -> Option<f64> {
        self.points.iter().map(|p| p.fidelity).reduce(f64::min)
    }
}
