//! Tolerance checks for factor-and-solve results
//!
//! Results are judged two ways: a solution vector against the answer it was
//! manufactured from (relative, in the L2 norm), and a reconstructed or
//! expected matrix against its reference (absolute, entrywise). Each helper
//! returns the measured deviation, so the assertion macros can say how far
//! off a failing result actually was.

use ndarray::*;

use crate::norm::*;
use chol::Entry;

/// Relative L2 deviation `||test - truth||_2 / ||truth||_2`.
pub fn l2_deviation<A, S1, S2, D>(test: &ArrayBase<S1, D>, truth: &ArrayBase<S2, D>) -> A
where
    A: Entry,
    S1: Data<Elem = A>,
    S2: Data<Elem = A>,
    D: Dimension,
{
    (test - truth).norm_l2() / truth.norm_l2()
}

/// Largest entrywise deviation `max |test - truth|`.
pub fn max_deviation<A, S1, S2, D>(test: &ArrayBase<S1, D>, truth: &ArrayBase<S2, D>) -> A
where
    A: Entry,
    S1: Data<Elem = A>,
    S2: Data<Elem = A>,
    D: Dimension,
{
    (test - truth).norm_max()
}

/// Relative residual `||b - A x||_2 / ||b||_2` of a computed solution.
pub fn relative_residual<A, Sa, Sx, Sb>(
    a: &ArrayBase<Sa, Ix2>,
    x: &ArrayBase<Sx, Ix1>,
    b: &ArrayBase<Sb, Ix1>,
) -> A
where
    A: Entry,
    Sa: Data<Elem = A>,
    Sx: Data<Elem = A>,
    Sb: Data<Elem = A>,
{
    (b - &a.dot(x)).norm_l2() / b.norm_l2()
}

/// Assert that two arrays agree to a relative L2 tolerance.
#[macro_export]
macro_rules! assert_l2_close {
    ($test:expr, $truth:expr, $rtol:expr) => {{
        let dev = $crate::l2_deviation($test, $truth);
        assert!(
            dev < $rtol,
            "relative L2 deviation {:e} is above the tolerance {:e}",
            dev,
            $rtol
        );
    }};
}

/// Assert that every entry of two arrays agrees to an absolute tolerance.
#[macro_export]
macro_rules! assert_max_close {
    ($test:expr, $truth:expr, $atol:expr) => {{
        let dev = $crate::max_deviation($test, $truth);
        assert!(
            dev < $atol,
            "largest entrywise deviation {:e} is above the tolerance {:e}",
            dev,
            $atol
        );
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deviations_measure_the_difference() {
        let truth = array![3.0, 4.0];
        let test = array![3.0, 4.5];
        assert_eq!(max_deviation(&test, &truth), 0.5);
        assert_eq!(l2_deviation(&test, &truth), 0.1);
    }

    #[test]
    fn residual_vanishes_for_an_exact_solution() {
        let a = array![[2.0, 0.0], [0.0, 4.0]];
        let x = array![1.0, 1.0];
        let b = array![2.0, 4.0];
        assert_eq!(relative_residual(&a, &x, &b), 0.0);

        let off = array![1.0, 0.0];
        assert!(relative_residual(&a, &off, &b) > 0.5);
    }

    #[test]
    fn macros_accept_passing_results() {
        let truth = array![1.0, 2.0];
        assert_l2_close!(&array![1.0, 2.0 + 1e-12], &truth, 1e-9);
        assert_max_close!(&array![1.0, 2.0 + 1e-12], &truth, 1e-9);
    }

    #[test]
    #[should_panic]
    fn l2_macro_rejects_out_of_tolerance_results() {
        assert_l2_close!(&array![1.0, 3.0], &array![1.0, 2.0], 1e-9);
    }
}
