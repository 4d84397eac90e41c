//! Parameterized trial circuits.
//!
//! An ansatz is a fixed gate sequence applied to a basis state. Each rotation
//! gate consumes one entry of the parameter vector, in sequence order.

use std::f64::consts::PI;

use nalgebra::DVector;
use nalgebra_sparse::csr::CsrMatrix;
use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::error::{invalid_config, VqsResult};
use crate::gates::{h_matrix, rx_matrix, ry_matrix, rz_matrix, x_matrix};
use crate::linalg::{controlled, embed_single_qubit};
use crate::observable::{Observable, Pauli};
use crate::qstate::QState;
use crate::Qbit;

#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "gate")]
pub enum AnsatzGate {
    RX {
        qubit: usize,
    },
    RY {
        qubit: usize,
    },
    RZ {
        qubit: usize,
    },
    H {
        qubit: usize,
    },
    #[serde(rename = "CNOT")]
    CNot {
        control: usize,
        target: usize,
    },
}

impl AnsatzGate {
    pub fn is_parameterized(&self) -> bool {
        matches!(
            self,
            AnsatzGate::RX { .. } | AnsatzGate::RY { .. } | AnsatzGate::RZ { .. }
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterizedGate {
    RX,
    RY,
    RZ,
}

impl ParameterizedGate {
    fn matrix(self, theta: f64) -> CsrMatrix<Qbit> {
        match self {
            ParameterizedGate::RX => rx_matrix(theta),
            ParameterizedGate::RY => ry_matrix(theta),
            ParameterizedGate::RZ => rz_matrix(theta),
        }
    }

    /// `P` in `R(θ) = exp(-iθP/2)`
    pub fn generator(self) -> Pauli {
        match self {
            ParameterizedGate::RX => Pauli::X,
            ParameterizedGate::RY => Pauli::Y,
            ParameterizedGate::RZ => Pauli::Z,
        }
    }
}

enum Step {
    Fixed(CsrMatrix<Qbit>),
    Parametric {
        gate: ParameterizedGate,
        qbit_index: usize,
    },
}

pub struct Ansatz {
    num_of_qbits: usize,
    steps: Vec<Step>,
    num_parameters: usize,
    initial: QState,
}

impl Ansatz {
    /// Ansatz starting from `|0...0>`.
    pub fn new(gates: &[AnsatzGate], num_of_qbits: usize) -> VqsResult<Self> {
        Self::with_initial_state(gates, QState::zero_state(num_of_qbits))
    }

    pub fn with_initial_state(gates: &[AnsatzGate], initial: QState) -> VqsResult<Self> {
        let num_of_qbits = initial.num_of_qbits();
        if num_of_qbits == 0 {
            return Err(invalid_config("ansatz needs at least one qubit"));
        }

        let mut steps = Vec::with_capacity(gates.len());
        for gate in gates {
            let step = match *gate {
                AnsatzGate::RX { qubit } => parametric(num_of_qbits, ParameterizedGate::RX, qubit)?,
                AnsatzGate::RY { qubit } => parametric(num_of_qbits, ParameterizedGate::RY, qubit)?,
                AnsatzGate::RZ { qubit } => parametric(num_of_qbits, ParameterizedGate::RZ, qubit)?,
                AnsatzGate::H { qubit } => {
                    Step::Fixed(embed_single_qubit(num_of_qbits, qubit, &h_matrix())?)
                }
                AnsatzGate::CNot { control, target } => {
                    Step::Fixed(controlled(num_of_qbits, control, target, &x_matrix())?)
                }
            };
            steps.push(step);
        }

        let num_parameters = gates.iter().filter(|g| g.is_parameterized()).count();

        Ok(Self {
            num_of_qbits,
            steps,
            num_parameters,
            initial,
        })
    }

    pub fn num_of_qbits(&self) -> usize {
        self.num_of_qbits
    }

    pub fn num_parameters(&self) -> usize {
        self.num_parameters
    }

    pub fn initial_state(&self) -> &QState {
        &self.initial
    }

    fn check_parameters(&self, theta: &[f64]) -> VqsResult<()> {
        if theta.len() != self.num_parameters {
            return Err(invalid_config(format!(
                "ansatz has {} parameterized gates but got {} parameters",
                self.num_parameters,
                theta.len()
            )));
        }
        Ok(())
    }

    pub fn state_at(&self, theta: &[f64]) -> VqsResult<QState> {
        self.check_parameters(theta)?;

        let mut state = self.initial.state.clone();
        let mut params = theta.iter();
        for step in &self.steps {
            state = match step {
                Step::Fixed(matrix) => matrix * &state,
                Step::Parametric { gate, qbit_index } => {
                    // Parameter count was checked above.
                    let value = params.next().copied().unwrap_or_default();
                    let matrix =
                        embed_single_qubit(self.num_of_qbits, *qbit_index, &gate.matrix(value))?;
                    &matrix * &state
                }
            };
        }
        Ok(QState::from_vector(state))
    }

    /// `∂ψ/∂θ_k` by the two-term shift rule for `exp(-iθP/2)` gates:
    /// `(ψ(θ + π·e_k) - ψ(θ - π·e_k)) / 4`. Exact, not a finite difference.
    pub fn derivative_at(&self, theta: &[f64], k: usize) -> VqsResult<DVector<Qbit>> {
        self.check_parameters(theta)?;
        if k >= self.num_parameters {
            return Err(invalid_config(format!(
                "parameter index {} out of range for {} parameters",
                k, self.num_parameters
            )));
        }

        let mut shifted = theta.to_vec();
        shifted[k] = theta[k] + PI;
        let plus = self.state_at(&shifted)?;
        shifted[k] = theta[k] - PI;
        let minus = self.state_at(&shifted)?;

        Ok((plus.state - minus.state) * Complex::new(0.25, 0.0))
    }

    pub fn derivatives_at(&self, theta: &[f64]) -> VqsResult<Vec<DVector<Qbit>>> {
        (0..self.num_parameters)
            .map(|k| self.derivative_at(theta, k))
            .collect()
    }

    /// `<Z>` on one qubit, a quick diagnostic of where the ansatz points.
    pub fn z_expectation(&self, theta: &[f64], qubit: usize) -> VqsResult<f64> {
        let state = self.state_at(theta)?;
        Observable::single(Pauli::Z, qubit).expectation_value(&state)
    }
}

fn parametric(num_of_qbits: usize, gate: ParameterizedGate, qubit: usize) -> VqsResult<Step> {
    if qubit >= num_of_qbits {
        return Err(invalid_config(format!(
            "qubit index {} out of bounds for {} qubits",
            qubit, num_of_qbits
        )));
    }
    Ok(Step::Parametric {
        gate,
        qbit_index: qubit,
    })
}

#[cfg(test)]
mod tests {
    use nalgebra_sparse::convert::serial::convert_csr_dense;

    use super::*;
    use crate::{assert_approx_complex_eq, assert_approx_eq};

    fn rx_ry_rz() -> Vec<AnsatzGate> {
        vec![
            AnsatzGate::RX { qubit: 0 },
            AnsatzGate::RY { qubit: 0 },
            AnsatzGate::RZ { qubit: 0 },
        ]
    }

    /// `∂ψ/∂θ_k` by inserting `-i/2·P` right after gate `k`.
    fn generator_derivative(ansatz: &Ansatz, theta: &[f64], k: usize) -> VqsResult<DVector<Qbit>> {
        let mut state = ansatz.initial.state.clone();
        let mut param_index = 0;
        for step in &ansatz.steps {
            match step {
                Step::Fixed(matrix) => state = matrix * &state,
                Step::Parametric { gate, qbit_index } => {
                    let value = theta[param_index];
                    let matrix =
                        embed_single_qubit(ansatz.num_of_qbits, *qbit_index, &gate.matrix(value))?;
                    state = &matrix * &state;
                    if param_index == k {
                        let generator = embed_single_qubit(
                            ansatz.num_of_qbits,
                            *qbit_index,
                            &gate.generator().matrix(),
                        )?;
                        state = (&generator * &state) * Complex::new(0.0, -0.5);
                    }
                    param_index += 1;
                }
            }
        }
        Ok(state)
    }

    #[test]
    fn test_ry_on_zero() -> VqsResult<()> {
        let ansatz = Ansatz::new(&[AnsatzGate::RY { qubit: 0 }], 1)?;
        let theta = 0.8;
        let state = ansatz.state_at(&[theta])?;

        assert_approx_complex_eq!((theta / 2.0).cos(), 0.0, state.state[0]);
        assert_approx_complex_eq!((theta / 2.0).sin(), 0.0, state.state[1]);
        Ok(())
    }

    #[test]
    fn test_state_is_normalized() -> VqsResult<()> {
        let ansatz = Ansatz::new(&rx_ry_rz(), 1)?;
        let state = ansatz.state_at(&[0.05, 0.05, 0.05])?;
        assert_approx_eq!(1.0, state.norm());
        Ok(())
    }

    #[test]
    fn test_parameter_count_mismatch() -> VqsResult<()> {
        let ansatz = Ansatz::new(&rx_ry_rz(), 1)?;
        assert_eq!(3, ansatz.num_parameters());
        assert!(ansatz.state_at(&[0.1, 0.2]).is_err());
        assert!(ansatz.derivative_at(&[0.1, 0.2, 0.3], 3).is_err());
        Ok(())
    }

    #[test]
    fn test_rejects_bad_qubit_index() {
        assert!(Ansatz::new(&[AnsatzGate::RX { qubit: 1 }], 1).is_err());
        assert!(Ansatz::new(&[AnsatzGate::CNot { control: 0, target: 0 }], 2).is_err());
    }

    #[test]
    fn test_derivative_shape() -> VqsResult<()> {
        let ansatz = Ansatz::new(&rx_ry_rz(), 1)?;
        let derivatives = ansatz.derivatives_at(&[0.05, 0.05, 0.05])?;
        assert_eq!(3, derivatives.len());
        assert!(derivatives.iter().all(|d| d.len() == 2));
        Ok(())
    }

    #[test]
    fn test_shift_rule_matches_generator() -> VqsResult<()> {
        let gates = vec![
            AnsatzGate::RY { qubit: 0 },
            AnsatzGate::RX { qubit: 1 },
            AnsatzGate::CNot {
                control: 0,
                target: 1,
            },
            AnsatzGate::RZ { qubit: 1 },
            AnsatzGate::H { qubit: 0 },
            AnsatzGate::RY { qubit: 0 },
        ];
        let ansatz = Ansatz::new(&gates, 2)?;
        let theta = [0.3, -1.2, 0.7, 2.4];

        for k in 0..theta.len() {
            let shifted = ansatz.derivative_at(&theta, k)?;
            let analytic = generator_derivative(&ansatz, &theta, k)?;
            for (a, b) in shifted.iter().zip(analytic.iter()) {
                assert_approx_complex_eq!(b.re, b.im, *a);
            }
        }
        Ok(())
    }

    #[test]
    fn test_derivative_matches_finite_difference() -> VqsResult<()> {
        let ansatz = Ansatz::new(&rx_ry_rz(), 1)?;
        let theta = [0.4, -0.2, 1.1];
        let h = 1e-6;

        for k in 0..3 {
            let mut plus = theta.to_vec();
            plus[k] += h;
            let mut minus = theta.to_vec();
            minus[k] -= h;
            let numeric = (ansatz.state_at(&plus)?.state - ansatz.state_at(&minus)?.state)
                * Complex::new(0.5 / h, 0.0);
            let exact = ansatz.derivative_at(&theta, k)?;
            for (a, b) in exact.iter().zip(numeric.iter()) {
                assert_approx_complex_eq!(b.re, b.im, *a, 1e-8);
            }
        }
        Ok(())
    }

    #[test]
    fn test_cnot_entangles() -> VqsResult<()> {
        let gates = [
            AnsatzGate::H { qubit: 0 },
            AnsatzGate::CNot {
                control: 0,
                target: 1,
            },
        ];
        let ansatz = Ansatz::new(&gates, 2)?;
        assert_eq!(0, ansatz.num_parameters());

        // Bell state |00> + |11>
        let state = ansatz.state_at(&[])?;
        assert_approx_complex_eq!(1.0 / 2f64.sqrt(), 0.0, state.state[0]);
        assert_approx_complex_eq!(0.0, 0.0, state.state[1]);
        assert_approx_complex_eq!(0.0, 0.0, state.state[2]);
        assert_approx_complex_eq!(1.0 / 2f64.sqrt(), 0.0, state.state[3]);
        Ok(())
    }

    #[test]
    fn test_initial_state_and_z_expectation() -> VqsResult<()> {
        let ansatz = Ansatz::with_initial_state(&[AnsatzGate::RX { qubit: 0 }], QState::from_bits("1")?)?;
        assert_approx_eq!(-1.0, ansatz.z_expectation(&[0.0], 0)?);
        assert_approx_eq!(1.0, ansatz.z_expectation(&[PI], 0)?);

        let x = convert_csr_dense(&ParameterizedGate::RX.generator().matrix());
        assert_approx_complex_eq!(1.0, 0.0, x[(0, 1)]);
        Ok(())
    }

    #[test]
    fn test_gate_sequence_from_json() {
        let json = r#"[{"gate": "RY", "qubit": 0}, {"gate": "CNOT", "control": 0, "target": 1}]"#;
        let gates: Vec<AnsatzGate> = serde_json::from_str(json).unwrap();
        assert_eq!(
            gates,
            vec![
                AnsatzGate::RY { qubit: 0 },
                AnsatzGate::CNot {
                    control: 0,
                    target: 1
                }
            ]
        );
    }
}
