use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ansatz::Ansatz;
use crate::error::{invalid_config, IllConditionedMetric, VqsResult};
use crate::hamiltonian::TimeDependentHamiltonian;
use crate::mclachlan::McLachlanSolver;

/// `t_max / dt` this close to an integer counts as that integer, so that
/// `1.0 / 0.01` never rounds up to 101 steps.
const STEP_ROUNDING_TOLERANCE: f64 = 1e-6;

/// Upper bound on the number of steps in one run.
pub const MAX_STEPS: usize = 10_000_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorKind {
    /// `θ ← θ + Δt·θ̇(θ, t)`
    Euler,
    /// Classical fourth-order Runge-Kutta.
    #[default]
    Rk4,
}

/// Uniform grid on `[0, t_max]` with the last step clipped to land on `t_max`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeGrid {
    t_max: f64,
    dt: f64,
    num_steps: usize,
}

impl TimeGrid {
    pub fn new(t_max: f64, dt: f64) -> VqsResult<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(invalid_config(format!("dt must be positive, got {}", dt)));
        }
        if !t_max.is_finite() || t_max <= 0.0 {
            return Err(invalid_config(format!(
                "t_max must be positive, got {}",
                t_max
            )));
        }

        let ratio = t_max / dt;
        if !ratio.is_finite() || ratio > MAX_STEPS as f64 + STEP_ROUNDING_TOLERANCE {
            return Err(invalid_config(format!(
                "t_max / dt = {:e} exceeds the limit of {} steps",
                ratio, MAX_STEPS
            )));
        }

        let nearest = ratio.round();
        let steps = if (ratio - nearest).abs() <= STEP_ROUNDING_TOLERANCE {
            nearest
        } else {
            ratio.ceil()
        };
        let num_steps = steps.max(1.0) as usize;
        Ok(Self {
            t_max,
            dt,
            num_steps,
        })
    }

    pub fn t_max(&self) -> f64 {
        self.t_max
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// `t_i = min(i·Δt, t_max)`, with `t_{num_steps} = t_max` exactly.
    pub fn time(&self, i: usize) -> f64 {
        if i >= self.num_steps {
            self.t_max
        } else {
            (i as f64 * self.dt).min(self.t_max)
        }
    }

    /// All `num_steps + 1` grid points.
    pub fn times(&self) -> Vec<f64> {
        (0..=self.num_steps).map(|i| self.time(i)).collect()
    }

    /// `(t_i, t_{i+1})` for every step.
    pub fn intervals(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        (0..self.num_steps).map(|i| (self.time(i), self.time(i + 1)))
    }
}

/// `θ` after a step, with the worst conditioning warning seen while taking it.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterStep {
    pub time: f64,
    pub theta: Vec<f64>,
    pub warning: Option<IllConditionedMetric>,
}

pub struct TrajectoryIntegrator {
    solver: McLachlanSolver,
    kind: IntegratorKind,
}

impl TrajectoryIntegrator {
    pub fn new(solver: McLachlanSolver, kind: IntegratorKind) -> Self {
        Self { solver, kind }
    }

    pub fn kind(&self) -> IntegratorKind {
        self.kind
    }

    /// Advances `theta` from `t` to `t + dt`.
    pub fn step(
        &self,
        ansatz: &Ansatz,
        hamiltonian: &TimeDependentHamiltonian,
        theta: &[f64],
        t: f64,
        dt: f64,
    ) -> VqsResult<(Vec<f64>, Option<IllConditionedMetric>)> {
        let mut warning = None;
        let mut velocity = |theta: &[f64], t: f64| -> VqsResult<Vec<f64>> {
            let v = self.solver.solve(ansatz, hamiltonian, theta, t)?;
            warning = worst(warning, v.warning);
            Ok(v.theta_dot.iter().copied().collect())
        };

        let next = match self.kind {
            IntegratorKind::Euler => {
                let k1 = velocity(theta, t)?;
                axpy(theta, dt, &k1)
            }
            IntegratorKind::Rk4 => {
                let k1 = velocity(theta, t)?;
                let k2 = velocity(&axpy(theta, dt / 2.0, &k1), t + dt / 2.0)?;
                let k3 = velocity(&axpy(theta, dt / 2.0, &k2), t + dt / 2.0)?;
                let k4 = velocity(&axpy(theta, dt, &k3), t + dt)?;
                theta
                    .iter()
                    .enumerate()
                    .map(|(i, x)| x + dt / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]))
                    .collect()
            }
        };

        Ok((next, warning))
    }

    /// Snapshots of `θ` at every grid point, starting with `theta0` at `t = 0`.
    pub fn integrate(
        &self,
        ansatz: &Ansatz,
        hamiltonian: &TimeDependentHamiltonian,
        theta0: &[f64],
        grid: &TimeGrid,
    ) -> VqsResult<Vec<ParameterStep>> {
        let mut steps = Vec::with_capacity(grid.num_steps() + 1);
        steps.push(ParameterStep {
            time: 0.0,
            theta: theta0.to_vec(),
            warning: None,
        });

        let mut theta = theta0.to_vec();
        for (i, (t0, t1)) in grid.intervals().enumerate() {
            let (next, warning) = self.step(ansatz, hamiltonian, &theta, t0, t1 - t0)?;
            if let Some(w) = &warning {
                warn!(step = i + 1, "{}", w);
            }
            debug!(step = i + 1, t = t1, theta = ?next, "advanced parameters");

            theta = next;
            steps.push(ParameterStep {
                time: t1,
                theta: theta.clone(),
                warning,
            });
        }

        Ok(steps)
    }
}

fn axpy(x: &[f64], a: f64, y: &[f64]) -> Vec<f64> {
    x.iter().zip(y).map(|(x, y)| x + a * y).collect()
}

fn worst(
    current: Option<IllConditionedMetric>,
    new: Option<IllConditionedMetric>,
) -> Option<IllConditionedMetric> {
    match (current, new) {
        (Some(a), Some(b)) if b.condition_number > a.condition_number => Some(b),
        (Some(a), _) => Some(a),
        (None, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansatz::AnsatzGate;
    use crate::assert_approx_eq;
    use crate::error::VqsError;
    use crate::hamiltonian::{Coefficient, HamiltonianSchedule};
    use crate::observable::Pauli;

    #[test]
    fn test_grid_rejects_non_positive_values() {
        assert!(TimeGrid::new(1.0, 0.0).is_err());
        assert!(TimeGrid::new(1.0, -0.1).is_err());
        assert!(TimeGrid::new(0.0, 0.1).is_err());
        assert!(TimeGrid::new(f64::INFINITY, 0.1).is_err());
    }

    #[test]
    fn test_grid_step_count() -> VqsResult<()> {
        assert_eq!(100, TimeGrid::new(1.0, 0.01)?.num_steps());
        assert_eq!(2, TimeGrid::new(0.2, 0.1)?.num_steps());
        assert_eq!(1, TimeGrid::new(0.3, 0.3)?.num_steps());
        assert_eq!(4, TimeGrid::new(1.0, 0.3)?.num_steps());
        assert_eq!(1, TimeGrid::new(0.01, 0.3)?.num_steps());

        // Large but exact ratios keep every step
        assert_eq!(1_000_000, TimeGrid::new(1e3, 1e-3)?.num_steps());
        assert_eq!(MAX_STEPS, TimeGrid::new(1.0, 1.0 / MAX_STEPS as f64)?.num_steps());
        assert_eq!(1_000_001, TimeGrid::new(1e3 + 5e-4, 1e-3)?.num_steps());
        Ok(())
    }

    #[test]
    fn test_grid_rejects_too_many_steps() {
        assert!(matches!(
            TimeGrid::new(1e7, 1e-7),
            Err(VqsError::InvalidIntegrationConfig(_))
        ));
        assert!(TimeGrid::new(1e300, 1e-300).is_err());
        assert!(TimeGrid::new(1.0, 1.0 / (MAX_STEPS as f64 * 2.0)).is_err());
    }

    #[test]
    fn test_grid_clips_last_step() -> VqsResult<()> {
        let grid = TimeGrid::new(1.0, 0.3)?;
        let times = grid.times();
        assert_eq!(5, times.len());
        assert_approx_eq!(0.9, times[3]);
        assert_eq!(1.0, times[4]);

        let last = grid.intervals().last().unwrap();
        assert_approx_eq!(0.1, last.1 - last.0);
        Ok(())
    }

    #[test]
    fn test_linear_drive_is_integrated_exactly_by_rk4() -> VqsResult<()> {
        // H = (t/2)·Y with RY: θ̇ = t, so θ(t) = t²/2, a polynomial RK4 is exact on
        let ansatz = Ansatz::new(&[AnsatzGate::RY { qubit: 0 }], 1)?;
        let schedule = HamiltonianSchedule::new().with_pauli(
            Pauli::Y,
            0,
            Coefficient::Linear {
                offset: 0.0,
                slope: 0.5,
            },
        );
        let h = TimeDependentHamiltonian::new(&schedule, 1)?;
        let solver = McLachlanSolver::new(0.0, 1e6)?;

        let grid = TimeGrid::new(1.0, 0.25)?;
        let rk4 = TrajectoryIntegrator::new(solver, IntegratorKind::Rk4).integrate(&ansatz, &h, &[0.0], &grid)?;
        assert_eq!(5, rk4.len());
        assert_approx_eq!(0.5, rk4[4].theta[0], 1e-12);

        // Euler lags behind by Δt·t_max/2
        let euler =
            TrajectoryIntegrator::new(solver, IntegratorKind::Euler).integrate(&ansatz, &h, &[0.0], &grid)?;
        assert_approx_eq!(0.375, euler[4].theta[0], 1e-12);
        Ok(())
    }

    #[test]
    fn test_worst_warning_wins() {
        let w = |c| IllConditionedMetric {
            time: 0.0,
            condition_number: c,
            threshold: 1.0,
        };
        assert_eq!(Some(w(5.0)), worst(Some(w(2.0)), Some(w(5.0))));
        assert_eq!(Some(w(5.0)), worst(Some(w(5.0)), Some(w(2.0))));
        assert_eq!(Some(w(2.0)), worst(None, Some(w(2.0))));
        assert_eq!(None, worst(None, None));
    }
}
