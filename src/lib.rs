//! Variational quantum simulation with McLachlan's principle, checked against
//! exact evolution of the same time-dependent Hamiltonian.
//!
//! ```rust
//! use simple_vqs::{run, SimulationConfig};
//!
//! let config = SimulationConfig::driven_qubit().with_t_max(0.1);
//! let record = run(&config).unwrap();
//! assert_eq!(record.len(), 11);
//! assert!(record.min_fidelity().unwrap() > 0.99);
//! ```

pub mod ansatz;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod exact;
pub mod gates;
pub mod hamiltonian;
pub mod integrator;
pub mod linalg;
pub mod mclachlan;
pub mod observable;
pub mod qstate;
pub mod simulation;
pub mod test_util;

use num_complex::Complex;

pub type Qbit = Complex<f64>;

pub use ansatz::{Ansatz, AnsatzGate};
pub use config::{InitialTheta, SimulationConfig};
pub use error::{IllConditionedMetric, VqsError, VqsResult};
pub use evaluator::{bloch_vector, fidelity, TrajectoryPoint, TrajectoryRecord};
pub use exact::ExactReference;
pub use hamiltonian::{Coefficient, HamiltonianSchedule, TimeDependentHamiltonian};
pub use integrator::{IntegratorKind, TimeGrid, TrajectoryIntegrator};
pub use mclachlan::McLachlanSolver;
pub use qstate::QState;
pub use simulation::{run, Simulation, SimulationOutput};
