//! One-block triangular solves against a right-hand-side segment

use crate::error::*;
use crate::Entry;

/// Solve `R^T y = rhs` for one diagonal block, in place.
///
/// `r` is a dense `n x n` upper triangular block; its transpose is the lower
/// factor applied here by forward substitution.
pub fn tri_solve_lower_rhs<A: Entry>(n: usize, r: &[A], rhs: &mut [A]) -> Result<()> {
    for i in 0..n {
        if r[i * n + i].abs() < A::EPS {
            return Err(Error::SingularPivot { index: i });
        }

        rhs[i] /= r[i * n + i];

        let yi = rhs[i];
        for j in i + 1..n {
            rhs[j] -= yi * r[i * n + j];
        }
    }

    Ok(())
}

/// Solve `D R x = rhs` for one diagonal block, in place.
///
/// The segment is scaled by the signs first, then back-substituted against
/// the upper triangular `r`.
pub fn tri_solve_upper_rhs_with_diag<A: Entry>(
    n: usize,
    r: &[A],
    d: &[A],
    rhs: &mut [A],
) -> Result<()> {
    for i in 0..n {
        rhs[i] *= d[i];
    }

    for i in (0..n).rev() {
        if r[i * n + i].abs() < A::EPS {
            return Err(Error::SingularPivot { index: i });
        }

        rhs[i] /= r[i * n + i];

        let xi = rhs[i];
        for j in 0..i {
            rhs[j] -= xi * r[j * n + i];
        }
    }

    Ok(())
}
