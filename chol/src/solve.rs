//! Blocked triangular solves against the packed factor
//!
//! Both passes run single-threaded after the factorization has finished and
//! mutate the right-hand side in place. They reuse the first
//! `block_size^2` entries of the factorization workspace as their only
//! scratch block.

use crate::error::*;
use crate::gemm::{matvec_sub, matvec_sub_transposed};
use crate::packed::{gather_block, gather_diag};
use crate::triangular::{tri_solve_lower_rhs, tri_solve_upper_rhs_with_diag};
use crate::Entry;

/// Forward pass `R^T y = b`, ascending over the block rows.
///
/// `a` holds the packed factor, `rhs` enters as `b` and leaves as `y`.
pub fn solve_forward<A: Entry>(
    size: usize,
    a: &[A],
    rhs: &mut [A],
    workspace: &mut [A],
    block_size: usize,
) -> Result<()> {
    let bb = block_size * block_size;
    let ma = &mut workspace[..bb];
    let dim = |start: usize| block_size.min(size - start);

    let mut i = 0;
    while i < size {
        let ni = dim(i);

        gather_diag(a, i, size, ni, ma);
        tri_solve_lower_rhs(ni, ma, &mut rhs[i..i + ni]).map_err(|e| e.offset(i))?;

        let mut j = i + block_size;
        while j < size {
            let mj = dim(j);
            gather_block(a, i, j, size, ni, mj, ma);
            let (solved, tail) = rhs.split_at_mut(j);
            matvec_sub_transposed(ni, mj, ma, &solved[i..i + ni], &mut tail[..mj]);
            j += block_size;
        }

        i += block_size;
    }

    Ok(())
}

/// Backward pass `D R x = y`, descending over the block rows.
///
/// `a` holds the packed factor and `d` its sign vector; `rhs` enters as `y`
/// and leaves as the solution `x`.
pub fn solve_backward<A: Entry>(
    size: usize,
    a: &[A],
    d: &[A],
    rhs: &mut [A],
    workspace: &mut [A],
    block_size: usize,
) -> Result<()> {
    let bb = block_size * block_size;
    let ma = &mut workspace[..bb];
    let dim = |start: usize| block_size.min(size - start);

    // last block-row start: the edge block if there is one, else one full
    // block up
    let mut residue = size - size % block_size;
    if residue == size {
        residue -= block_size;
    }

    let mut i = residue;
    loop {
        let ni = dim(i);

        let mut j = residue;
        while j > i {
            let mj = dim(j);
            gather_block(a, i, j, size, ni, mj, ma);
            let (head, trailing) = rhs.split_at_mut(j);
            matvec_sub(ni, mj, ma, &trailing[..mj], &mut head[i..i + ni]);
            j -= block_size;
        }

        gather_diag(a, i, size, ni, ma);
        tri_solve_upper_rhs_with_diag(ni, ma, &d[i..i + ni], &mut rhs[i..i + ni])
            .map_err(|e| e.offset(i))?;

        if i == 0 {
            break;
        }
        i -= block_size;
    }

    Ok(())
}
