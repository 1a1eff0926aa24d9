//! In-block sign-aware Cholesky factorization

use crate::error::*;
use crate::Entry;

#[cfg_attr(doc, katexit::katexit)]
/// Factor a dense `n x n` block in place, $A = R^T D R$.
///
/// Only the upper triangle of `a` is meaningful. On return the upper triangle
/// holds the factor $R$ and `d[..n]` holds the signs $D \in \\{-1, +1\\}^n$:
/// a negative pivot is flipped positive and remembered in `d` instead of
/// aborting, which is what lets symmetric indefinite blocks through. Row `i`
/// is divided by the (positive) pivot root after the flip, so the stored
/// off-diagonals carry the sign of their row.
///
/// Fails with [`Error::SingularPivot`] when a pivot magnitude falls below
/// [`Entry::EPS`] after the sign flip.
pub fn cholesky_block<A: Entry>(n: usize, a: &mut [A], d: &mut [A]) -> Result<()> {
    for v in d[..n].iter_mut() {
        *v = A::one();
    }

    for i in 0..n {
        for k in 0..i {
            let rki = a[k * n + i] * d[k];
            for j in i..n {
                a[i * n + j] -= rki * a[k * n + j];
            }
        }

        if a[i * n + i] < A::zero() {
            d[i] = -A::one();
            a[i * n + i] = -a[i * n + i];
        }

        if a[i * n + i].abs() < A::EPS {
            return Err(Error::SingularPivot { index: i });
        }

        a[i * n + i] = a[i * n + i].sqrt();

        let piv = a[i * n + i].recip();
        for j in i + 1..n {
            a[i * n + j] *= piv;
        }
    }

    Ok(())
}

#[cfg_attr(doc, katexit::katexit)]
/// Invert an upper triangular block against the sign diagonal,
/// $B = R^{-1} D$.
///
/// `r` is the `n x n` factor produced by [`cholesky_block`], `d` its sign
/// vector. `dst` receives the upper triangular solution of $R B = D$; its
/// strict lower triangle is zeroed. The factorizer broadcasts this block to
/// every worker for the trailing block-row scaling.
pub fn inverse_upper_triangle_with_diag<A: Entry>(
    n: usize,
    r: &[A],
    d: &[A],
    dst: &mut [A],
) -> Result<()> {
    dst[..n * n].fill(A::zero());
    for i in 0..n {
        dst[i * n + i] = d[i];
    }

    for i in (0..n).rev() {
        if r[i * n + i].abs() < A::EPS {
            return Err(Error::SingularPivot { index: i });
        }

        let piv = r[i * n + i].recip();
        for j in i..n {
            dst[i * n + j] *= piv;
        }

        for row in 0..i {
            let rji = r[row * n + i];
            for k in i..n {
                let t = dst[i * n + k] * rji;
                dst[row * n + k] -= t;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(n: usize, r: &[f64], d: &[f64]) -> Vec<f64> {
        // A' = R^T D R over the upper triangle
        let mut a = vec![0.0; n * n];
        for i in 0..n {
            for j in i..n {
                for k in 0..=i {
                    a[i * n + j] += r[k * n + i] * d[k] * r[k * n + j];
                }
            }
        }
        a
    }

    #[test]
    fn factors_spd_2x2() {
        let mut a = [4.0, 2.0, 0.0, 3.0];
        let mut d = [0.0; 2];
        cholesky_block(2, &mut a, &mut d).unwrap();
        assert_eq!(d, [1.0, 1.0]);
        assert_eq!(a[0], 2.0);
        assert_eq!(a[1], 1.0);
        assert!((a[3] - 2f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn factors_classic_3x3() {
        // upper triangle of [[4,12,-16],[12,37,-43],[-16,-43,98]]
        let mut a = [4.0, 12.0, -16.0, 0.0, 37.0, -43.0, 0.0, 0.0, 98.0];
        let mut d = [0.0; 3];
        cholesky_block(3, &mut a, &mut d).unwrap();
        assert_eq!(d, [1.0, 1.0, 1.0]);
        let want: [f64; 9] = [2.0, 6.0, -8.0, 0.0, 1.0, 5.0, 0.0, 0.0, 3.0];
        for (got, want) in a.iter().zip(&want) {
            assert!((got - want).abs() < 1e-12, "{got} vs {want}");
        }
    }

    #[test]
    fn flips_negative_pivots() {
        let mut a = [1.0, 0.0, 0.0, 0.0, -4.0, 0.0, 0.0, 0.0, 9.0];
        let mut d = [0.0; 3];
        cholesky_block(3, &mut a, &mut d).unwrap();
        assert_eq!(d, [1.0, -1.0, 1.0]);
        assert_eq!(a[4], 2.0);

        let rec = reconstruct(3, &a, &d);
        assert_eq!(rec[0], 1.0);
        assert_eq!(rec[4], -4.0);
        assert_eq!(rec[8], 9.0);
    }

    #[test]
    fn reconstructs_random_spd() {
        // G^T G + 5 I for a fixed G, factored and rebuilt
        let n = 4;
        let g: Vec<f64> = (0..n * n).map(|k| ((k * 7 + 3) % 11) as f64 / 11.0).collect();
        let mut a = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    a[i * n + j] += g[k * n + i] * g[k * n + j];
                }
            }
            a[i * n + i] += 5.0;
        }
        let orig = a.clone();

        let mut d = [0.0; 4];
        cholesky_block(n, &mut a, &mut d).unwrap();
        let rec = reconstruct(n, &a, &d);
        for i in 0..n {
            for j in i..n {
                assert!((rec[i * n + j] - orig[i * n + j]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn detects_singular_block() {
        let mut a = [0.0, 1.0, 0.0, 0.0];
        let mut d = [0.0; 2];
        assert_eq!(
            cholesky_block(2, &mut a, &mut d),
            Err(Error::SingularPivot { index: 0 })
        );
    }

    #[test]
    fn inverse_solves_r_b_equals_d() {
        let r: [f64; 9] = [2.0, 6.0, -8.0, 0.0, 1.0, 5.0, 0.0, 0.0, 3.0];
        let d: [f64; 3] = [1.0, -1.0, 1.0];
        let mut b: [f64; 9] = [0.0; 9];
        inverse_upper_triangle_with_diag(3, &r, &d, &mut b).unwrap();

        // R * B == diag(d)
        let n = 3;
        for i in 0..n {
            for j in 0..n {
                let mut acc = 0.0;
                for k in 0..n {
                    acc += r[i * n + k] * b[k * n + j];
                }
                let want = if i == j { d[i] } else { 0.0 };
                assert!((acc - want).abs() < 1e-13, "({i}, {j}): {acc}");
            }
        }
    }
}
