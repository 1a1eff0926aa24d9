//! Packed upper-triangular storage and block gather/scatter
//!
//! The upper triangle of a symmetric matrix of order `size` is laid out row
//! by row: row `i` starts at `i * size - i * (i - 1) / 2` and holds the
//! entries for columns `i..size`. Entries below the diagonal are not stored;
//! callers mirror `a[(j, i)]` when they need them.
//!
//! The numerical kernels never touch packed storage directly. Blocks are
//! copied ("gathered") into dense row-major scratch buffers, worked on, and
//! copied back ("scattered"). A block starting at `(row, col)` has effective
//! dimensions `min(block_size, size - row) x min(block_size, size - col)`, so
//! the trailing edge of the matrix yields short blocks.

use crate::Entry;

/// Number of stored entries for a packed matrix of order `size`.
pub fn packed_len(size: usize) -> usize {
    size * (size + 1) / 2
}

/// Offset of the first stored entry of row `i`.
pub fn row_start(i: usize, size: usize) -> usize {
    i * size - (i * i - i) / 2
}

/// Offset of entry `(row, col)`, requiring `row <= col`.
pub fn entry_offset(row: usize, col: usize, size: usize) -> usize {
    debug_assert!(row <= col && col < size);
    row_start(row, size) + col - row
}

/// Copy an `n x m` off-diagonal block at `(row, col)` into a dense buffer.
///
/// The block must lie on or above the diagonal block row, i.e. `col >= row`
/// and every block row segment is stored. `dst` is zeroed over its first
/// `n * m` cells before the copy.
pub fn gather_block<A: Entry>(
    a: &[A],
    row: usize,
    col: usize,
    size: usize,
    n: usize,
    m: usize,
    dst: &mut [A],
) {
    dst[..n * m].fill(A::zero());

    let mut k = entry_offset(row, col, size);
    for i in 0..n {
        dst[i * m..i * m + m].copy_from_slice(&a[k..k + m]);
        k += size - (row + i) - 1;
    }
}

/// Write an `n x m` dense block back to packed storage at `(row, col)`.
pub fn scatter_block<A: Entry>(
    a: &mut [A],
    row: usize,
    col: usize,
    size: usize,
    n: usize,
    m: usize,
    src: &[A],
) {
    let mut k = entry_offset(row, col, size);
    for i in 0..n {
        a[k..k + m].copy_from_slice(&src[i * m..i * m + m]);
        k += size - (row + i) - 1;
    }
}

/// Copy the `m x m` diagonal block starting at `(start, start)` into a dense
/// buffer: upper triangle from storage, strict lower triangle zero.
pub fn gather_diag<A: Entry>(a: &[A], start: usize, size: usize, m: usize, dst: &mut [A]) {
    dst[..m * m].fill(A::zero());

    let mut k = row_start(start, size);
    for i in 0..m {
        let len = m - i;
        dst[i * m + i..i * m + m].copy_from_slice(&a[k..k + len]);
        k += size - (start + i);
    }
}

/// Write the upper triangle of a dense `m x m` block back to the diagonal
/// block starting at `(start, start)`. Cells below the diagonal are ignored.
pub fn scatter_diag<A: Entry>(a: &mut [A], start: usize, size: usize, m: usize, src: &[A]) {
    let mut k = row_start(start, size);
    for i in 0..m {
        let len = m - i;
        a[k..k + len].copy_from_slice(&src[i * m + i..i * m + m]);
        k += size - (start + i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_injective_and_in_range() {
        for size in 1..=12 {
            let mut seen = vec![false; packed_len(size)];
            for row in 0..size {
                for col in row..size {
                    let k = entry_offset(row, col, size);
                    assert!(k < packed_len(size), "({row}, {col}) out of range");
                    assert!(!seen[k], "({row}, {col}) collides at {k}");
                    seen[k] = true;
                }
            }
            assert!(seen.iter().all(|&s| s));
        }
    }

    #[test]
    fn row_start_matches_entry_offset() {
        let size = 9;
        for i in 0..size {
            assert_eq!(row_start(i, size), entry_offset(i, i, size));
        }
    }

    fn numbered(size: usize) -> Vec<f64> {
        (0..packed_len(size)).map(|k| k as f64).collect()
    }

    #[test]
    fn gather_block_reads_row_segments() {
        // order 4 packed: [0 1 2 3 | 4 5 6 | 7 8 | 9]
        let a = numbered(4);
        let mut b = [0.0; 4];
        gather_block(&a, 0, 2, 4, 2, 2, &mut b);
        assert_eq!(b, [2.0, 3.0, 5.0, 6.0]);
    }

    #[test]
    fn gather_diag_zeroes_strict_lower() {
        let a = numbered(4);
        let mut b = [-1.0; 9];
        gather_diag(&a, 1, 4, 3, &mut b);
        assert_eq!(&b[..9], &[4.0, 5.0, 6.0, 0.0, 7.0, 8.0, 0.0, 0.0, 9.0]);
    }

    #[test]
    fn block_round_trip() {
        for (size, bs) in [(4, 2), (5, 2), (7, 3), (11, 4)] {
            let mut a = numbered(size);
            let mut row = 0;
            while row < size {
                let n = bs.min(size - row);
                let mut col = row + bs;
                while col < size {
                    let m = bs.min(size - col);
                    let mut x: Vec<f64> = (0..n * m).map(|k| -(k as f64) - 100.0).collect();
                    scatter_block(&mut a, row, col, size, n, m, &x);
                    x.iter_mut().for_each(|v| *v = 0.0);
                    gather_block(&a, row, col, size, n, m, &mut x);
                    for (k, v) in x.iter().enumerate() {
                        assert_eq!(*v, -(k as f64) - 100.0);
                    }
                    col += bs;
                }
                row += bs;
            }
        }
    }

    #[test]
    fn diag_round_trip_keeps_upper() {
        let size = 5;
        let mut a = numbered(size);
        let m = 3;
        let mut x = vec![0.0; m * m];
        // dense block with distinct upper entries and garbage below
        for i in 0..m {
            for j in 0..m {
                x[i * m + j] = if j >= i { (10 * i + j) as f64 } else { -7.0 };
            }
        }
        scatter_diag(&mut a, 2, size, m, &x);
        let mut y = vec![0.0; m * m];
        gather_diag(&a, 2, size, m, &mut y);
        for i in 0..m {
            for j in 0..m {
                let want = if j >= i { (10 * i + j) as f64 } else { 0.0 };
                assert_eq!(y[i * m + j], want);
            }
        }
    }
}
