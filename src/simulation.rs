use tracing::{info, instrument};

use crate::ansatz::Ansatz;
use crate::config::SimulationConfig;
use crate::error::VqsResult;
use crate::evaluator::TrajectoryRecord;
use crate::exact::ExactReference;
use crate::hamiltonian::TimeDependentHamiltonian;
use crate::integrator::{TimeGrid, TrajectoryIntegrator};
use crate::qstate::QState;

/// Everything a run produced: the record plus both state trajectories.
#[derive(Clone, Debug)]
pub struct SimulationOutput {
    pub record: TrajectoryRecord,
    pub variational_states: Vec<QState>,
    pub exact_states: Vec<QState>,
}

/// A fully validated run, ready to go.
pub struct Simulation {
    hamiltonian: TimeDependentHamiltonian,
    ansatz: Ansatz,
    integrator: TrajectoryIntegrator,
    grid: TimeGrid,
    theta0: Vec<f64>,
}

impl Simulation {
    /// Validates the configuration and builds every operator up front, so
    /// that a bad configuration never gets to take a step.
    pub fn new(config: &SimulationConfig) -> VqsResult<Self> {
        config.validate()?;

        let initial = match &config.initial_state {
            Some(bits) => QState::from_bits(bits)?,
            None => QState::zero_state(config.qubit_count),
        };
        let hamiltonian =
            TimeDependentHamiltonian::new(&config.hamiltonian_schedule, config.qubit_count)?;
        let ansatz = Ansatz::with_initial_state(&config.ansatz_gate_sequence, initial)?;
        let theta0 = config.initial_theta.resolve(ansatz.num_parameters())?;

        Ok(Self {
            hamiltonian,
            ansatz,
            integrator: TrajectoryIntegrator::new(config.solver()?, config.integrator),
            grid: config.time_grid()?,
            theta0,
        })
    }

    pub fn hamiltonian(&self) -> &TimeDependentHamiltonian {
        &self.hamiltonian
    }

    pub fn ansatz(&self) -> &Ansatz {
        &self.ansatz
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn initial_theta(&self) -> &[f64] {
        &self.theta0
    }

    pub fn run_detailed(&self) -> VqsResult<SimulationOutput> {
        info!(
            qubits = self.ansatz.num_of_qbits(),
            parameters = self.ansatz.num_parameters(),
            steps = self.grid.num_steps(),
            integrator = ?self.integrator.kind(),
            "starting variational simulation"
        );

        let steps = self
            .integrator
            .integrate(&self.ansatz, &self.hamiltonian, &self.theta0, &self.grid)?;

        let mut variational_states = Vec::with_capacity(steps.len());
        for step in &steps {
            let psi = self.ansatz.state_at(&step.theta)?;
            psi.check_normalized(step.time)?;
            variational_states.push(psi);
        }

        let exact_states = ExactReference::trajectory(
            &self.hamiltonian,
            self.ansatz.initial_state().clone(),
            &self.grid,
        )?;

        let record = TrajectoryRecord::evaluate(&steps, &variational_states, &exact_states)?;

        info!(
            points = record.len(),
            mean_fidelity = ?record.mean_fidelity(),
            min_fidelity = ?record.min_fidelity(),
            ill_conditioned_steps = record.warnings().count(),
            "finished variational simulation"
        );

        Ok(SimulationOutput {
            record,
            variational_states,
            exact_states,
        })
    }

    pub fn run(&self) -> VqsResult<TrajectoryRecord> {
        self.run_detailed().map(|output| output.record)
    }
}

/// Runs the variational and exact evolutions described by `config` and
/// returns one `(time, θ, fidelity)` point per grid time, both ends included.
#[instrument(skip(config), fields(t_max = config.t_max, dt = config.dt))]
pub fn run(config: &SimulationConfig) -> VqsResult<TrajectoryRecord> {
    Simulation::new(config)?.run()
}
