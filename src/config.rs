//! Run configuration.
//!
//! Every option of a run lives in [`SimulationConfig`], which deserializes from
//! JSON and is validated as a whole before anything is computed:
//!
//! ```json
//! {
//!   "t_max": 1.0,
//!   "dt": 0.01,
//!   "initial_theta": [0.0],
//!   "hamiltonian_schedule": { "terms": [
//!     { "operator": { "pauli": [["Z", 0]] }, "coefficient": { "constant": 0.5 } },
//!     { "operator": { "pauli": [["X", 0]] },
//!       "coefficient": { "sine": { "amplitude": 0.5, "frequency": 1.0 } } }
//!   ] },
//!   "ansatz_gate_sequence": [{ "gate": "RY", "qubit": 0 }],
//!   "qubit_count": 1
//! }
//! ```

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::ansatz::AnsatzGate;
use crate::error::{invalid_config, VqsResult};
use crate::hamiltonian::HamiltonianSchedule;
use crate::integrator::{IntegratorKind, TimeGrid};
use crate::mclachlan::{McLachlanSolver, DEFAULT_CONDITION_THRESHOLD, DEFAULT_REGULARIZATION};

/// Dense state vectors stop being cheap beyond this.
pub const MAX_QUBITS: usize = 10;

/// Starting parameters: an explicit list, or a seeded normal draw around zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitialTheta {
    Fixed(Vec<f64>),
    Random { seed: u64, spread: f64 },
}

impl InitialTheta {
    pub fn resolve(&self, num_parameters: usize) -> VqsResult<Vec<f64>> {
        match self {
            InitialTheta::Fixed(theta) => {
                if theta.len() != num_parameters {
                    return Err(invalid_config(format!(
                        "initial_theta has {} entries but the ansatz has {} parameterized gates",
                        theta.len(),
                        num_parameters
                    )));
                }
                if theta.iter().any(|v| !v.is_finite()) {
                    return Err(invalid_config("initial_theta has non-finite entries"));
                }
                Ok(theta.clone())
            }
            InitialTheta::Random { seed, spread } => {
                let normal = Normal::new(0.0, *spread)
                    .map_err(|e| invalid_config(format!("invalid spread {}: {}", spread, e)))?;
                let mut rng = StdRng::seed_from_u64(*seed);
                Ok((0..num_parameters).map(|_| rng.sample(normal)).collect())
            }
        }
    }
}

fn default_regularization() -> f64 {
    DEFAULT_REGULARIZATION
}

fn default_condition_threshold() -> f64 {
    DEFAULT_CONDITION_THRESHOLD
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    pub t_max: f64,
    pub dt: f64,
    pub initial_theta: InitialTheta,
    pub hamiltonian_schedule: HamiltonianSchedule,
    pub ansatz_gate_sequence: Vec<AnsatzGate>,
    pub qubit_count: usize,
    /// Basis state shared by the ansatz and the exact reference, qubit 0
    /// last. All zeros when absent.
    #[serde(default)]
    pub initial_state: Option<String>,
    #[serde(default)]
    pub integrator: IntegratorKind,
    #[serde(default = "default_regularization")]
    pub regularization: f64,
    #[serde(default = "default_condition_threshold")]
    pub condition_threshold: f64,
}

impl Default for SimulationConfig {
    /// `H(t) = cos(t)·Z + sin(t)·X` followed for five time units by an
    /// RX·RY·RZ ansatz started slightly off `|0>`.
    fn default() -> Self {
        Self {
            t_max: 5.0,
            dt: 0.05,
            initial_theta: InitialTheta::Fixed(vec![0.05, 0.05, 0.05]),
            hamiltonian_schedule: HamiltonianSchedule::rotating_field(),
            ansatz_gate_sequence: vec![
                AnsatzGate::RX { qubit: 0 },
                AnsatzGate::RY { qubit: 0 },
                AnsatzGate::RZ { qubit: 0 },
            ],
            qubit_count: 1,
            initial_state: None,
            integrator: IntegratorKind::default(),
            regularization: DEFAULT_REGULARIZATION,
            condition_threshold: DEFAULT_CONDITION_THRESHOLD,
        }
    }
}

impl SimulationConfig {
    /// `H(t) = 0.5·Z + 0.5·sin(t)·X` with a single RY gate from `θ = 0` up to
    /// `t = 1`.
    pub fn driven_qubit() -> Self {
        Self {
            t_max: 1.0,
            dt: 0.01,
            initial_theta: InitialTheta::Fixed(vec![0.0]),
            hamiltonian_schedule: HamiltonianSchedule::driven_qubit(),
            ansatz_gate_sequence: vec![AnsatzGate::RY { qubit: 0 }],
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> VqsResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| invalid_config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_t_max(mut self, t_max: f64) -> Self {
        self.t_max = t_max;
        self
    }

    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_initial_theta(mut self, theta: Vec<f64>) -> Self {
        self.initial_theta = InitialTheta::Fixed(theta);
        self
    }

    pub fn with_integrator(mut self, integrator: IntegratorKind) -> Self {
        self.integrator = integrator;
        self
    }

    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    pub fn with_condition_threshold(mut self, threshold: f64) -> Self {
        self.condition_threshold = threshold;
        self
    }

    pub fn num_parameters(&self) -> usize {
        self.ansatz_gate_sequence
            .iter()
            .filter(|g| g.is_parameterized())
            .count()
    }

    pub fn time_grid(&self) -> VqsResult<TimeGrid> {
        TimeGrid::new(self.t_max, self.dt)
    }

    pub fn solver(&self) -> VqsResult<McLachlanSolver> {
        McLachlanSolver::new(self.regularization, self.condition_threshold)
    }

    /// Checks everything that does not need an operator to be built. Operator
    /// level problems surface when the run assembles the Hamiltonian and
    /// ansatz, still before the first step.
    pub fn validate(&self) -> VqsResult<()> {
        self.time_grid()?;
        self.solver()?;

        if self.qubit_count == 0 || self.qubit_count > MAX_QUBITS {
            return Err(invalid_config(format!(
                "qubit_count must be between 1 and {}, got {}",
                MAX_QUBITS, self.qubit_count
            )));
        }

        if let Some(bits) = &self.initial_state {
            if bits.len() != self.qubit_count || !bits.chars().all(|c| c == '0' || c == '1') {
                return Err(invalid_config(format!(
                    "initial_state {:?} is not a {}-qubit bit string",
                    bits, self.qubit_count
                )));
            }
        }

        self.initial_theta.resolve(self.num_parameters())?;
        Ok(())
    }
}
