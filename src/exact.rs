use tracing::trace;

use crate::error::{invalid_config, VqsResult};
use crate::hamiltonian::TimeDependentHamiltonian;
use crate::integrator::TimeGrid;
use crate::qstate::QState;

/// Reference evolution by stepwise exponentiation of the Hamiltonian.
/// Knows nothing about the ansatz or its parameters.
pub struct ExactReference<'a> {
    hamiltonian: &'a TimeDependentHamiltonian,
    state: QState,
    time: f64,
}

impl<'a> ExactReference<'a> {
    pub fn new(hamiltonian: &'a TimeDependentHamiltonian, initial: QState) -> VqsResult<Self> {
        if initial.num_of_qbits() != hamiltonian.num_of_qbits() {
            return Err(invalid_config(format!(
                "initial state has {} qubits but the Hamiltonian acts on {}",
                initial.num_of_qbits(),
                hamiltonian.num_of_qbits()
            )));
        }
        initial.check_normalized(0.0)?;

        Ok(Self {
            hamiltonian,
            state: initial,
            time: 0.0,
        })
    }

    pub fn state(&self) -> &QState {
        &self.state
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// `ψ(t1) = U(t, t1)·ψ(t)`. The norm is checked before renormalizing, so
    /// only round-off drift is ever absorbed.
    pub fn advance(&mut self, t1: f64) -> VqsResult<&QState> {
        let propagator = self.hamiltonian.propagator_between(self.time, t1);
        let next = self.state.apply(&propagator);
        next.check_normalized(t1)?;
        trace!(t = t1, norm = next.norm(), "exact step");

        self.state = next.normalized();
        self.time = t1;
        Ok(&self.state)
    }

    /// States at every grid point, starting with `initial`.
    pub fn trajectory(
        hamiltonian: &TimeDependentHamiltonian,
        initial: QState,
        grid: &TimeGrid,
    ) -> VqsResult<Vec<QState>> {
        let mut reference = ExactReference::new(hamiltonian, initial)?;
        let mut states = Vec::with_capacity(grid.num_steps() + 1);
        states.push(reference.state().clone());
        for (_, t1) in grid.intervals() {
            states.push(reference.advance(t1)?.clone());
        }
        Ok(states)
    }
}
