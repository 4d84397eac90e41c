//! Dense and sparse operator helpers shared by the Hamiltonian, the ansatz and
//! the exact reference.
//!
//! Qubit `k` maps to bit `k` of a basis index, so qubit 0 is the rightmost
//! factor of every Kronecker product built here.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{coo::CooMatrix, csr::CsrMatrix};
use num_complex::Complex;

use crate::error::{invalid_config, VqsResult};
use crate::gates::from_entries;
use crate::Qbit;

pub fn kronecker_product(x: &CsrMatrix<Qbit>, y: &CsrMatrix<Qbit>) -> CsrMatrix<Qbit> {
    let mut result = CooMatrix::new(x.nrows() * y.nrows(), x.ncols() * y.ncols());

    for (rx, cx, value_x) in x.triplet_iter() {
        for (ry, cy, value_y) in y.triplet_iter() {
            let new_row = rx * y.nrows() + ry;
            let new_col = cx * y.ncols() + cy;
            result.push(new_row, new_col, value_x * value_y);
        }
    }

    CsrMatrix::from(&result)
}

fn check_and_reverse_index(num_of_qbits: usize, index: usize) -> VqsResult<usize> {
    if index >= num_of_qbits {
        return Err(invalid_config(format!(
            "qubit index {} out of bounds for {} qubits",
            index, num_of_qbits
        )));
    }
    Ok(num_of_qbits - 1 - index)
}

/// Lifts a 2x2 gate acting on `index` to the full `2^n` space.
pub fn embed_single_qubit(
    num_of_qbits: usize,
    index: usize,
    gate: &CsrMatrix<Qbit>,
) -> VqsResult<CsrMatrix<Qbit>> {
    let index = check_and_reverse_index(num_of_qbits, index)?;
    let id = CsrMatrix::identity(2);
    Ok(kronecker_chain(num_of_qbits, |i| if i == index { gate } else { &id }))
}

/// `|0><0| ⊗ I + |1><1| ⊗ gate` with the projectors on `control`.
pub fn controlled(
    num_of_qbits: usize,
    control: usize,
    target: usize,
    gate: &CsrMatrix<Qbit>,
) -> VqsResult<CsrMatrix<Qbit>> {
    let control = check_and_reverse_index(num_of_qbits, control)?;
    let target = check_and_reverse_index(num_of_qbits, target)?;
    if control == target {
        return Err(invalid_config(
            "control and target qubits cannot be the same",
        ));
    }

    let one = Complex::new(1.0, 0.0);
    let id = CsrMatrix::identity(2);
    let branch = |projector: &CsrMatrix<Qbit>, on_target: &CsrMatrix<Qbit>| {
        kronecker_chain(num_of_qbits, |i| match i {
            i if i == control => projector,
            i if i == target => on_target,
            _ => &id,
        })
    };

    let idle = branch(&from_entries(&[(0, 0, one)]), &id);
    let active = branch(&from_entries(&[(1, 1, one)]), gate);
    Ok(idle + active)
}

/// `f(0) ⊗ f(1) ⊗ ... ⊗ f(n-1)`, leftmost factor first.
fn kronecker_chain<'a>(
    num_of_qbits: usize,
    factor: impl Fn(usize) -> &'a CsrMatrix<Qbit>,
) -> CsrMatrix<Qbit> {
    (0..num_of_qbits).fold(CsrMatrix::identity(1), |acc, i| {
        kronecker_product(&acc, factor(i))
    })
}

/// Largest entry of `|H - H†|`.
pub fn hermitian_deviation(h: &DMatrix<Qbit>) -> f64 {
    if h.nrows() != h.ncols() {
        return f64::INFINITY;
    }
    (h - h.adjoint()).iter().map(|v| v.norm()).fold(0.0, f64::max)
}

/// `exp(-i·H·dt)` for Hermitian `H`.
///
/// `H = A + iB` is diagonalized through its real symmetric embedding
/// `[[A, -B], [B, A]]`. Real-coefficient functions commute with that
/// embedding, so `cos(H·dt)` and `sin(H·dt)` are read back from the blocks of
/// the embedded results and combined as `cos - i·sin`.
pub fn evolution_operator(h: &DMatrix<Qbit>, dt: f64) -> DMatrix<Qbit> {
    let n = h.nrows();
    let h = (h + h.adjoint()) * Complex::new(0.5, 0.0);

    let embedded = DMatrix::from_fn(2 * n, 2 * n, |i, j| {
        let entry = h[(i % n, j % n)];
        match (i < n, j < n) {
            (true, true) | (false, false) => entry.re,
            (true, false) => -entry.im,
            (false, true) => entry.im,
        }
    });

    let eigen = embedded.symmetric_eigen();
    let q = &eigen.eigenvectors;
    let apply = |f: fn(f64) -> f64| -> DMatrix<f64> {
        let diagonal = DVector::from_iterator(
            2 * n,
            eigen.eigenvalues.iter().map(|&lambda| f(lambda * dt)),
        );
        q * DMatrix::from_diagonal(&diagonal) * q.transpose()
    };
    let cos = apply(f64::cos);
    let sin = apply(f64::sin);

    DMatrix::from_fn(n, n, |i, j| {
        let cos_entry = Complex::new(cos[(i, j)], cos[(i + n, j)]);
        let sin_entry = Complex::new(sin[(i, j)], sin[(i + n, j)]);
        cos_entry - Qbit::i() * sin_entry
    })
}
