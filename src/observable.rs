use nalgebra::DMatrix;
use nalgebra_sparse::{convert::serial::convert_csr_dense, CsrMatrix};
use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::{
    error::{invalid_config, VqsResult},
    gates::{x_matrix, y_matrix, z_matrix},
    linalg::kronecker_product,
    qstate::QState,
    Qbit,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    I,
    X,
    Y,
    Z,
}

impl Pauli {
    pub fn matrix(self) -> CsrMatrix<Qbit> {
        match self {
            Pauli::I => CsrMatrix::identity(2),
            Pauli::X => x_matrix(),
            Pauli::Y => y_matrix(),
            Pauli::Z => z_matrix(),
        }
    }
}

/// Tensor product of single-qubit Paulis; unlisted qubits are identity.
pub fn pauli_string_matrix(num_of_qbits: usize, ops: &[(Pauli, usize)]) -> VqsResult<DMatrix<Qbit>> {
    let mut kinds = vec![Pauli::I; num_of_qbits];
    for &(kind, index) in ops {
        let slot = kinds.get_mut(index).ok_or_else(|| {
            invalid_config(format!(
                "Pauli {:?} on qubit {} but only {} qubits",
                kind, index, num_of_qbits
            ))
        })?;
        *slot = kind;
    }

    let mut op = CsrMatrix::identity(1);
    for kind in kinds.iter().rev() {
        op = kronecker_product(&op, &kind.matrix());
    }
    Ok(convert_csr_dense(&op))
}

#[derive(Clone, Debug, Default)]
pub struct Observable {
    operators: Vec<PauliOperator>,
}

#[derive(Clone, Debug)]
struct PauliOperator {
    coefficient: f64,
    ops: Vec<(Pauli, usize)>,
}

impl Observable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(kind: Pauli, index: usize) -> Self {
        let mut observable = Self::new();
        observable.add_pauli_operator(1.0, &[(kind, index)]);
        observable
    }

    pub fn add_pauli_operator(&mut self, coefficient: f64, ops: &[(Pauli, usize)]) {
        self.operators.push(PauliOperator {
            coefficient,
            ops: ops.to_vec(),
        });
    }

    pub fn to_matrix(&self, num_of_qbits: usize) -> VqsResult<DMatrix<Qbit>> {
        let dim = 1_usize << num_of_qbits;
        let mut matrix = DMatrix::zeros(dim, dim);
        for operator in &self.operators {
            matrix += pauli_string_matrix(num_of_qbits, &operator.ops)?
                * Complex::new(operator.coefficient, 0.0);
        }
        Ok(matrix)
    }

    pub fn expectation_value(&self, qstate: &QState) -> VqsResult<f64> {
        let matrix = self.to_matrix(qstate.num_of_qbits())?;
        qstate.expectation_value(&matrix, 0.0)
    }
}
