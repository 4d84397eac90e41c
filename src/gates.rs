use nalgebra_sparse::{coo::CooMatrix, csr::CsrMatrix};
use num_complex::Complex;

use crate::Qbit;

pub(crate) fn from_entries(entries: &[(usize, usize, Qbit)]) -> CsrMatrix<Qbit> {
    let mut coo = CooMatrix::new(2, 2);
    for &(row, col, value) in entries {
        coo.push(row, col, value);
    }
    CsrMatrix::from(&coo)
}

pub fn h_matrix() -> CsrMatrix<Qbit> {
    let v = Complex::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
    from_entries(&[(0, 0, v), (0, 1, v), (1, 0, v), (1, 1, -v)])
}

pub fn x_matrix() -> CsrMatrix<Qbit> {
    let one = Complex::new(1.0, 0.0);
    from_entries(&[(0, 1, one), (1, 0, one)])
}

pub fn y_matrix() -> CsrMatrix<Qbit> {
    from_entries(&[(0, 1, Complex::new(0.0, -1.0)), (1, 0, Complex::new(0.0, 1.0))])
}

pub fn z_matrix() -> CsrMatrix<Qbit> {
    from_entries(&[(0, 0, Complex::new(1.0, 0.0)), (1, 1, Complex::new(-1.0, 0.0))])
}

/// RX(θ) = exp(-iθX/2)
pub fn rx_matrix(theta: f64) -> CsrMatrix<Qbit> {
    let c = Complex::new((theta / 2.0).cos(), 0.0);
    let s = Complex::new(0.0, -(theta / 2.0).sin());
    from_entries(&[(0, 0, c), (0, 1, s), (1, 0, s), (1, 1, c)])
}

/// RY(θ) = exp(-iθY/2)
pub fn ry_matrix(theta: f64) -> CsrMatrix<Qbit> {
    let c = Complex::new((theta / 2.0).cos(), 0.0);
    let s = Complex::new((theta / 2.0).sin(), 0.0);
    from_entries(&[(0, 0, c), (0, 1, -s), (1, 0, s), (1, 1, c)])
}

/// RZ(θ) = exp(-iθZ/2)
pub fn rz_matrix(theta: f64) -> CsrMatrix<Qbit> {
    from_entries(&[
        (0, 0, Complex::from_polar(1.0, -theta / 2.0)),
        (1, 1, Complex::from_polar(1.0, theta / 2.0)),
    ])
}
