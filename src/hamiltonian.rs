//! Time-dependent Hamiltonians built from a closed-form coefficient schedule.
//!
//! A schedule is a list of terms `c_k(t) · O_k`, where each `O_k` is a Pauli
//! string or an explicit Hermitian matrix, and each `c_k` is one of a few
//! closed-form functions of time fixed at configuration time:
//!
//! ```rust
//! use simple_vqs::hamiltonian::{Coefficient, HamiltonianSchedule, TimeDependentHamiltonian};
//! use simple_vqs::observable::Pauli;
//!
//! // H(t) = 0.5·Z + 0.5·sin(t)·X
//! let schedule = HamiltonianSchedule::new()
//!     .with_pauli(Pauli::Z, 0, Coefficient::Constant(0.5))
//!     .with_pauli(Pauli::X, 0, Coefficient::sine(0.5, 1.0));
//! let h = TimeDependentHamiltonian::new(&schedule, 1).unwrap();
//! assert_eq!(h.hamiltonian_at(0.3).nrows(), 2);
//! ```

use nalgebra::DMatrix;
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{invalid_config, VqsError, VqsResult},
    linalg::{evolution_operator, hermitian_deviation},
    observable::{pauli_string_matrix, Pauli},
    Qbit,
};

/// Largest tolerated entry of `|H - H†|`.
pub const HERMITIAN_TOLERANCE: f64 = 1e-8;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coefficient {
    Constant(f64),
    /// `offset + slope·t`
    Linear { offset: f64, slope: f64 },
    /// `amplitude·sin(frequency·t + phase)`
    Sine {
        amplitude: f64,
        frequency: f64,
        #[serde(default)]
        phase: f64,
    },
    /// `amplitude·cos(frequency·t + phase)`
    Cosine {
        amplitude: f64,
        frequency: f64,
        #[serde(default)]
        phase: f64,
    },
}

impl Coefficient {
    pub fn sine(amplitude: f64, frequency: f64) -> Self {
        Coefficient::Sine {
            amplitude,
            frequency,
            phase: 0.0,
        }
    }

    pub fn cosine(amplitude: f64, frequency: f64) -> Self {
        Coefficient::Cosine {
            amplitude,
            frequency,
            phase: 0.0,
        }
    }

    pub fn at(&self, t: f64) -> f64 {
        match *self {
            Coefficient::Constant(c) => c,
            Coefficient::Linear { offset, slope } => offset + slope * t,
            Coefficient::Sine {
                amplitude,
                frequency,
                phase,
            } => amplitude * (frequency * t + phase).sin(),
            Coefficient::Cosine {
                amplitude,
                frequency,
                phase,
            } => amplitude * (frequency * t + phase).cos(),
        }
    }

    fn is_finite(&self) -> bool {
        match *self {
            Coefficient::Constant(c) => c.is_finite(),
            Coefficient::Linear { offset, slope } => offset.is_finite() && slope.is_finite(),
            Coefficient::Sine {
                amplitude,
                frequency,
                phase,
            }
            | Coefficient::Cosine {
                amplitude,
                frequency,
                phase,
            } => amplitude.is_finite() && frequency.is_finite() && phase.is_finite(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermOperator {
    /// `[(kind, qubit), ...]`
    Pauli(Vec<(Pauli, usize)>),
    /// Dense matrix, rows of `[re, im]` entries.
    Matrix(Vec<Vec<[f64; 2]>>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTerm {
    pub operator: TermOperator,
    pub coefficient: Coefficient,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HamiltonianSchedule {
    pub terms: Vec<ScheduledTerm>,
}

impl HamiltonianSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_term(mut self, operator: TermOperator, coefficient: Coefficient) -> Self {
        self.terms.push(ScheduledTerm {
            operator,
            coefficient,
        });
        self
    }

    pub fn with_pauli(self, kind: Pauli, qubit: usize, coefficient: Coefficient) -> Self {
        self.with_term(TermOperator::Pauli(vec![(kind, qubit)]), coefficient)
    }

    /// `H(t) = cos(t)·Z + sin(t)·X`
    pub fn rotating_field() -> Self {
        Self::new()
            .with_pauli(Pauli::Z, 0, Coefficient::cosine(1.0, 1.0))
            .with_pauli(Pauli::X, 0, Coefficient::sine(1.0, 1.0))
    }

    /// `H(t) = 0.5·Z + 0.5·sin(t)·X`
    pub fn driven_qubit() -> Self {
        Self::new()
            .with_pauli(Pauli::Z, 0, Coefficient::Constant(0.5))
            .with_pauli(Pauli::X, 0, Coefficient::sine(0.5, 1.0))
    }
}

fn dense_term(num_of_qbits: usize, rows: &[Vec<[f64; 2]>]) -> VqsResult<DMatrix<Qbit>> {
    let dim = 1_usize << num_of_qbits;
    if rows.len() != dim || rows.iter().any(|row| row.len() != dim) {
        return Err(invalid_config(format!(
            "matrix term must be {}x{} for {} qubits",
            dim, dim, num_of_qbits
        )));
    }
    if rows.iter().flatten().flatten().any(|v| !v.is_finite()) {
        return Err(invalid_config("matrix term has non-finite entries"));
    }

    Ok(DMatrix::from_fn(dim, dim, |i, j| {
        let [re, im] = rows[i][j];
        Complex::new(re, im)
    }))
}

pub struct TimeDependentHamiltonian {
    num_of_qbits: usize,
    terms: Vec<(DMatrix<Qbit>, Coefficient)>,
}

impl TimeDependentHamiltonian {
    /// Builds every term operator once. Fails before any evolution when a
    /// term is malformed or not Hermitian.
    pub fn new(schedule: &HamiltonianSchedule, num_of_qbits: usize) -> VqsResult<Self> {
        if num_of_qbits == 0 {
            return Err(invalid_config("qubit count must be at least 1"));
        }

        let mut terms = Vec::with_capacity(schedule.terms.len());
        for term in &schedule.terms {
            if !term.coefficient.is_finite() {
                return Err(invalid_config(format!(
                    "coefficient {:?} has non-finite parameters",
                    term.coefficient
                )));
            }
            let operator = match &term.operator {
                TermOperator::Pauli(ops) => pauli_string_matrix(num_of_qbits, ops)?,
                TermOperator::Matrix(rows) => dense_term(num_of_qbits, rows)?,
            };
            let deviation = hermitian_deviation(&operator);
            if deviation > HERMITIAN_TOLERANCE {
                return Err(VqsError::NonHermitianOperator {
                    time: 0.0,
                    deviation,
                });
            }
            terms.push((operator, term.coefficient.clone()));
        }

        debug!(
            "Built Hamiltonian with {} terms on {} qubits",
            terms.len(),
            num_of_qbits
        );

        Ok(Self {
            num_of_qbits,
            terms,
        })
    }

    pub fn num_of_qbits(&self) -> usize {
        self.num_of_qbits
    }

    pub fn dim(&self) -> usize {
        1 << self.num_of_qbits
    }

    pub fn hamiltonian_at(&self, t: f64) -> DMatrix<Qbit> {
        let mut h = DMatrix::zeros(self.dim(), self.dim());
        for (operator, coefficient) in &self.terms {
            h += operator * Complex::new(coefficient.at(t), 0.0);
        }
        h
    }

    /// Verifies `H(t) = H(t)†` within [`HERMITIAN_TOLERANCE`].
    pub fn check_hermitian(&self, t: f64) -> VqsResult<()> {
        let deviation = hermitian_deviation(&self.hamiltonian_at(t));
        if deviation > HERMITIAN_TOLERANCE {
            return Err(VqsError::NonHermitianOperator { time: t, deviation });
        }
        Ok(())
    }

    /// `exp(-i·H(t_mid)·(t1 - t0))` with `t_mid` the interval midpoint. Accurate
    /// to second order in the step for a smoothly varying schedule.
    pub fn propagator_between(&self, t0: f64, t1: f64) -> DMatrix<Qbit> {
        let midpoint = 0.5 * (t0 + t1);
        evolution_operator(&self.hamiltonian_at(midpoint), t1 - t0)
    }
}
