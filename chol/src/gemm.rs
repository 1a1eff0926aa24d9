//! Dense block multiply kernels
//!
//! All operands are contiguous row-major blocks no larger than the block
//! size. The inner loops run over whole block rows so the compiler can
//! vectorize them.

use crate::Entry;

/// Schur-complement update `C <- C - A^T * diag(d) * B`.
///
/// `a` is `n x m`, `b` is `n x l`, `d` has length `n` and `c` is `m x l`.
/// This folds an already-factored block row pair into the block under work.
pub fn gemm_subtract_with_diag<A: Entry>(
    n: usize,
    m: usize,
    l: usize,
    a: &[A],
    b: &[A],
    d: &[A],
    c: &mut [A],
) {
    for k in 0..n {
        let dk = d[k];
        let arow = &a[k * m..k * m + m];
        let brow = &b[k * l..k * l + l];
        for i in 0..m {
            let alpha = arow[i] * dk;
            for (cv, bv) in c[i * l..i * l + l].iter_mut().zip(brow) {
                *cv -= alpha * *bv;
            }
        }
    }
}

/// `C <- A^T * B` with `a` of shape `n x m`, `b` of shape `n x l` and `c` of
/// shape `m x l`. `c` is zeroed before accumulation.
///
/// The left operand is consumed transposed: row `k` of `a` distributes
/// `a[(k, i)]` over row `k` of `b`. The trailing block-row scaling of the
/// factorization relies on exactly this orientation, since its left operand
/// (the inverted diagonal block times the sign diagonal) is triangular.
pub fn gemm_transposed<A: Entry>(n: usize, m: usize, l: usize, a: &[A], b: &[A], c: &mut [A]) {
    c[..m * l].fill(A::zero());

    for k in 0..n {
        let arow = &a[k * m..k * m + m];
        let brow = &b[k * l..k * l + l];
        for i in 0..m {
            let alpha = arow[i];
            for (cv, bv) in c[i * l..i * l + l].iter_mut().zip(brow) {
                *cv += alpha * *bv;
            }
        }
    }
}

/// `c <- c - A * b` with `a` of shape `n x m`, `b` of length `m` and `c` of
/// length `n`.
pub fn matvec_sub<A: Entry>(n: usize, m: usize, a: &[A], b: &[A], c: &mut [A]) {
    for i in 0..n {
        let arow = &a[i * m..i * m + m];
        let mut acc = A::zero();
        for (av, bv) in arow.iter().zip(b) {
            acc += *av * *bv;
        }
        c[i] -= acc;
    }
}

/// `c <- c - A^T * b` with `a` of shape `n x m`, `b` of length `n` and `c` of
/// length `m`.
pub fn matvec_sub_transposed<A: Entry>(n: usize, m: usize, a: &[A], b: &[A], c: &mut [A]) {
    for j in 0..n {
        let arow = &a[j * m..j * m + m];
        let bj = b[j];
        for (cv, av) in c[..m].iter_mut().zip(arow) {
            *cv -= *av * bj;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_at_b(n: usize, m: usize, l: usize, a: &[f64], b: &[f64]) -> Vec<f64> {
        let mut c = vec![0.0; m * l];
        for i in 0..m {
            for j in 0..l {
                for k in 0..n {
                    c[i * l + j] += a[k * m + i] * b[k * l + j];
                }
            }
        }
        c
    }

    #[test]
    fn transposed_multiply_matches_naive() {
        let (n, m, l) = (3, 2, 4);
        let a: Vec<f64> = (0..n * m).map(|k| k as f64 + 1.0).collect();
        let b: Vec<f64> = (0..n * l).map(|k| (k as f64) * 0.5 - 2.0).collect();
        let mut c = vec![7.0; m * l];
        gemm_transposed(n, m, l, &a, &b, &mut c);
        assert_eq!(c, naive_at_b(n, m, l, &a, &b));
    }

    #[test]
    fn subtract_with_diag_matches_naive() {
        let (n, m, l) = (2, 3, 3);
        let a: Vec<f64> = (0..n * m).map(|k| k as f64 - 2.5).collect();
        let b: Vec<f64> = (0..n * l).map(|k| (k as f64) * 1.5).collect();
        let d = [1.0, -1.0];
        let mut c = vec![10.0; m * l];
        gemm_subtract_with_diag(n, m, l, &a, &b, &d, &mut c);

        let mut want = vec![10.0; m * l];
        for i in 0..m {
            for j in 0..l {
                for k in 0..n {
                    want[i * l + j] -= a[k * m + i] * d[k] * b[k * l + j];
                }
            }
        }
        assert_eq!(c, want);
    }

    #[test]
    fn matvec_variants() {
        // a = [[1, 2], [3, 4], [5, 6]]
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];

        let mut c = [1.0, 1.0, 1.0];
        matvec_sub(3, 2, &a, &[10.0, 100.0], &mut c);
        assert_eq!(c, [1.0 - 210.0, 1.0 - 430.0, 1.0 - 650.0]);

        let mut c = [1.0, 1.0];
        matvec_sub_transposed(3, 2, &a, &[1.0, 1.0, 1.0], &mut c);
        assert_eq!(c, [1.0 - 9.0, 1.0 - 12.0]);
    }
}
