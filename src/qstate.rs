use std::fmt::Display;
use std::str::FromStr;

use nalgebra::{DMatrix, DVector};
use num_complex::Complex;

use crate::error::{invalid_config, VqsError, VqsResult};
use crate::Qbit;

/// Tolerance for unit norm and for real-valued expectations.
pub const NORM_TOLERANCE: f64 = 1e-8;

#[derive(Clone, Debug, PartialEq)]
pub struct QState {
    pub(crate) state: DVector<Qbit>,
}

impl QState {
    pub fn new(state: &[Qbit]) -> VqsResult<Self> {
        let len = state.len();
        if len == 0 || (len & (len - 1)) != 0 {
            return Err(invalid_config(
                "state vector length must be a non-zero power of 2",
            ));
        }

        let state = DVector::from_row_slice(state);
        Ok(Self { state })
    }

    pub(crate) fn from_vector(state: DVector<Qbit>) -> Self {
        Self { state }
    }

    pub fn zero_state(num_of_qbits: usize) -> Self {
        let size = 1_usize << num_of_qbits;
        let mut state = DVector::zeros(size);
        state[0] = Complex::new(1.0, 0.0); // |0...0> state
        Self { state }
    }

    /// Basis state from a bit string, qubit 0 being the last character.
    pub fn from_bits(qbits: &str) -> VqsResult<Self> {
        if qbits.is_empty() {
            return Err(invalid_config("basis state bit string is empty"));
        }
        let index = usize::from_str_radix(qbits, 2)
            .map_err(|e| invalid_config(format!("invalid basis state {:?}: {}", qbits, e)))?;
        let mut state = DVector::zeros(1_usize << qbits.len());
        state[index] = Complex::new(1.0, 0.0);

        Ok(Self { state })
    }

    pub fn num_of_qbits(&self) -> usize {
        self.state.len().ilog2() as usize
    }

    pub fn amplitudes(&self) -> &DVector<Qbit> {
        &self.state
    }

    pub fn norm(&self) -> f64 {
        self.state.norm()
    }

    /// `<self|other>`
    pub fn inner(&self, other: &QState) -> Qbit {
        self.state.dotc(&other.state)
    }

    pub fn apply(&self, operator: &DMatrix<Qbit>) -> QState {
        QState {
            state: operator * &self.state,
        }
    }

    pub fn normalized(&self) -> QState {
        QState {
            state: self.state.normalize(),
        }
    }

    /// Fails with [`VqsError::NonUnitaryState`] unless the norm is 1 within
    /// [`NORM_TOLERANCE`].
    pub fn check_normalized(&self, time: f64) -> VqsResult<()> {
        let norm = self.norm();
        if !norm.is_finite() || (norm - 1.0).abs() > NORM_TOLERANCE {
            return Err(VqsError::NonUnitaryState { time, norm });
        }
        Ok(())
    }

    /// `<ψ|H|ψ>`. A complex result means `H` was not Hermitian.
    pub fn expectation_value(&self, operator: &DMatrix<Qbit>, time: f64) -> VqsResult<f64> {
        let value = self.state.dotc(&(operator * &self.state));
        if value.im.abs() > NORM_TOLERANCE {
            return Err(VqsError::NonHermitianOperator {
                time,
                deviation: value.im.abs(),
            });
        }
        Ok(value.re)
    }
}

impl FromStr for QState {
    type Err = VqsError;

    fn from_str(qbits: &str) -> Result<Self, Self::Err> {
        Self::from_bits(qbits)
    }
}

impl Display for QState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bin_width = self.num_of_qbits();

        for (i, value) in self.state.iter().enumerate() {
            writeln!(f, "|{:0width$b}>: {}", i, value, width = bin_width)?;
        }

        Ok(())
    }
}

impl From<QState> for DVector<Qbit> {
    fn from(qstate: QState) -> Self {
        qstate.state
    }
}
