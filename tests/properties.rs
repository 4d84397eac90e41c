//! Property-based tests for the variational building blocks.
//!
//! Random two-qubit ansätze and random parameters must always give unit-norm
//! states, a symmetric positive semi-definite metric and Hermitian
//! Hamiltonians with real expectation values.

use std::f64::consts::PI;

use proptest::prelude::*;
use simple_vqs::hamiltonian::TermOperator;
use simple_vqs::linalg::hermitian_deviation;
use simple_vqs::mclachlan::metric_tensor;
use simple_vqs::observable::Pauli;
use simple_vqs::{
    Ansatz, AnsatzGate, Coefficient, HamiltonianSchedule, McLachlanSolver, QState,
    TimeDependentHamiltonian,
};

const NUM_QUBITS: usize = 2;

fn arb_gate() -> impl Strategy<Value = AnsatzGate> {
    prop_oneof![
        (0..NUM_QUBITS).prop_map(|qubit| AnsatzGate::RX { qubit }),
        (0..NUM_QUBITS).prop_map(|qubit| AnsatzGate::RY { qubit }),
        (0..NUM_QUBITS).prop_map(|qubit| AnsatzGate::RZ { qubit }),
        (0..NUM_QUBITS).prop_map(|qubit| AnsatzGate::H { qubit }),
        Just(AnsatzGate::CNot {
            control: 0,
            target: 1
        }),
        Just(AnsatzGate::CNot {
            control: 1,
            target: 0
        }),
    ]
}

/// A gate sequence paired with one angle per parameterized gate.
fn arb_ansatz() -> impl Strategy<Value = (Vec<AnsatzGate>, Vec<f64>)> {
    prop::collection::vec(arb_gate(), 1..=8).prop_flat_map(|gates| {
        let num_parameters = gates.iter().filter(|g| g.is_parameterized()).count();
        (
            Just(gates),
            prop::collection::vec(-2.0 * PI..2.0 * PI, num_parameters),
        )
    })
}

/// Two-qubit schedule mixing Pauli strings and an explicit Hermitian matrix.
fn mixed_schedule() -> HamiltonianSchedule {
    let hermitian = vec![
        vec![[0.3, 0.0], [0.1, -0.2], [0.0, 0.0], [0.0, 0.4]],
        vec![[0.1, 0.2], [-0.5, 0.0], [0.2, 0.0], [0.0, 0.0]],
        vec![[0.0, 0.0], [0.2, 0.0], [0.1, 0.0], [0.3, 0.3]],
        vec![[0.0, -0.4], [0.0, 0.0], [0.3, -0.3], [0.0, 0.0]],
    ];
    HamiltonianSchedule::new()
        .with_term(
            TermOperator::Pauli(vec![
                (Pauli::Z, 0),
                (Pauli::Z, 1),
            ]),
            Coefficient::cosine(0.7, 1.3),
        )
        .with_term(
            TermOperator::Pauli(vec![(Pauli::X, 1)]),
            Coefficient::Linear {
                offset: -0.2,
                slope: 0.5,
            },
        )
        .with_term(TermOperator::Matrix(hermitian), Coefficient::sine(1.0, 0.4))
}

proptest! {
    #[test]
    fn ansatz_state_is_normalized((gates, theta) in arb_ansatz()) {
        let ansatz = Ansatz::new(&gates, NUM_QUBITS).unwrap();
        let psi = ansatz.state_at(&theta).unwrap();
        prop_assert!((psi.norm() - 1.0).abs() < 1e-8, "norm = {}", psi.norm());
    }

    #[test]
    fn metric_is_symmetric_positive_semidefinite((gates, theta) in arb_ansatz()) {
        let ansatz = Ansatz::new(&gates, NUM_QUBITS).unwrap();
        let metric = metric_tensor(&ansatz.derivatives_at(&theta).unwrap());

        prop_assert_eq!(metric.clone(), metric.transpose());
        if metric.nrows() > 0 {
            let eigenvalues = metric.symmetric_eigen().eigenvalues;
            prop_assert!(
                eigenvalues.iter().all(|&l| l >= -1e-8),
                "eigenvalues = {}",
                eigenvalues
            );
        }
    }

    #[test]
    fn hamiltonian_is_hermitian_with_real_expectations(
        (gates, theta) in arb_ansatz(),
        t in 0.0_f64..20.0,
    ) {
        let h = TimeDependentHamiltonian::new(&mixed_schedule(), NUM_QUBITS).unwrap();
        let h_t = h.hamiltonian_at(t);
        prop_assert!(hermitian_deviation(&h_t) < 1e-8);
        prop_assert!(h.check_hermitian(t).is_ok());

        let psi = Ansatz::new(&gates, NUM_QUBITS).unwrap().state_at(&theta).unwrap();
        let energy = psi.expectation_value(&h_t, t);
        prop_assert!(energy.is_ok(), "expectation failed: {:?}", energy);
    }

    #[test]
    fn solver_is_deterministic((gates, theta) in arb_ansatz(), t in 0.0_f64..5.0) {
        let ansatz = Ansatz::new(&gates, NUM_QUBITS).unwrap();
        let h = TimeDependentHamiltonian::new(&mixed_schedule(), NUM_QUBITS).unwrap();
        let solver = McLachlanSolver::default();

        let a = solver.solve(&ansatz, &h, &theta, t).unwrap();
        let b = solver.solve(&ansatz, &h, &theta, t).unwrap();
        prop_assert_eq!(a.theta_dot, b.theta_dot);
        prop_assert!(a.condition_number >= 1.0);
    }

    #[test]
    fn evolution_preserves_norm(t0 in 0.0_f64..10.0, dt in 1e-3_f64..0.5) {
        let h = TimeDependentHamiltonian::new(&mixed_schedule(), NUM_QUBITS).unwrap();
        let psi = QState::from_bits("01").unwrap();
        let next = psi.apply(&h.propagator_between(t0, t0 + dt));
        prop_assert!((next.norm() - 1.0).abs() < 1e-8);
    }
}
