//! Conversion between `ndarray` matrices and packed triangular storage

use ndarray::*;

use crate::error::*;
use chol::{packed_len, Entry};

/// Pack the upper triangle of a square matrix, row by row.
///
/// Only entries on or above the diagonal are read; the matrix is assumed
/// symmetric and the strict lower triangle is ignored, mirroring how a full
/// symmetric input is stored.
pub fn pack_upper<A, S>(a: &ArrayBase<S, Ix2>) -> Result<Vec<A>>
where
    A: Entry,
    S: Data<Elem = A>,
{
    let (rows, cols) = a.dim();
    if rows != cols {
        return Err(CholeskyError::NotSquare { rows, cols });
    }

    let mut packed = Vec::with_capacity(packed_len(rows));
    for i in 0..rows {
        for j in i..cols {
            packed.push(a[(i, j)]);
        }
    }
    Ok(packed)
}

/// Expand packed storage into a dense upper triangular matrix, zero below the
/// diagonal.
pub fn unpack_upper<A: Entry>(packed: &[A], n: usize) -> Result<Array2<A>> {
    if packed.len() != packed_len(n) {
        return Err(CholeskyError::ShapeMismatch {
            expected: packed_len(n),
            actual: packed.len(),
        });
    }

    let mut a = Array2::zeros((n, n));
    let mut k = 0;
    for i in 0..n {
        for j in i..n {
            a[(i, j)] = packed[k];
            k += 1;
        }
    }
    Ok(a)
}

/// Expand packed storage into a dense symmetric matrix, mirroring the upper
/// triangle below the diagonal.
pub fn unpack_symmetric<A: Entry>(packed: &[A], n: usize) -> Result<Array2<A>> {
    let mut a = unpack_upper(packed, n)?;
    for i in 0..n {
        for j in 0..i {
            a[(i, j)] = a[(j, i)];
        }
    }
    Ok(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_reads_upper_triangle_only() {
        let a = array![[1.0, 2.0], [-999.0, 3.0]];
        assert_eq!(pack_upper(&a).unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn pack_rejects_rectangular() {
        let a: Array2<f64> = Array2::zeros((2, 3));
        assert!(matches!(
            pack_upper(&a),
            Err(CholeskyError::NotSquare { rows: 2, cols: 3 })
        ));
    }

    #[test]
    fn unpack_round_trips() {
        let a = array![[1.0, 2.0, 3.0], [2.0, 4.0, 5.0], [3.0, 5.0, 6.0]];
        let packed = pack_upper(&a).unwrap();
        assert_eq!(unpack_symmetric(&packed, 3).unwrap(), a);

        let upper = unpack_upper(&packed, 3).unwrap();
        assert_eq!(upper[(1, 0)], 0.0);
        assert_eq!(upper[(0, 1)], 2.0);
    }
}
