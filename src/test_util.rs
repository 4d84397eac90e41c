#[macro_export]
macro_rules! assert_approx_eq {
    ($expected:expr, $actual:expr) => {
        $crate::assert_approx_eq!($expected, $actual, 1e-10)
    };
    ($expected:expr, $actual:expr, $eps:expr) => {{
        let expected: f64 = $expected;
        let actual: f64 = $actual;
        let eps: f64 = $eps;
        assert!(
            (expected - actual).abs() < eps,
            "Expected {}, but got {} (eps = {})",
            expected,
            actual,
            eps
        );
    }};
}

#[macro_export]
macro_rules! assert_approx_complex_eq {
    ($expected_re:expr, $expected_im:expr, $actual:expr) => {
        $crate::assert_approx_complex_eq!($expected_re, $expected_im, $actual, 1e-10)
    };
    ($expected_re:expr, $expected_im:expr, $actual:expr, $eps:expr) => {{
        let expected_re: f64 = $expected_re;
        let expected_im: f64 = $expected_im;
        let actual: $crate::Qbit = $actual;
        let eps: f64 = $eps;
        assert!(
            (expected_re - actual.re).abs() < eps && (expected_im - actual.im).abs() < eps,
            "Expected {}+{}i, but got {}",
            expected_re,
            expected_im,
            actual
        );
    }};
}
