//! Solve real symmetric linear problems
//!
//! The factorization runs blocked over packed upper-triangular storage and
//! accepts indefinite matrices by tracking a diagonal of signs, so no
//! pivoting strategy beyond the sign flip is applied. Factor once with
//! [`FactorizeH`], then solve any number of right-hand sides with
//! [`SolveH`].

use ndarray::*;

use crate::convert::*;
use crate::error::*;
use chol::{scratch_len, Entry};

/// Blocking configuration for the factorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactorOpts {
    /// Side length of the dense blocks the matrix is processed in; must lie
    /// in `[1, n]`.
    pub block_size: usize,
    /// Worker threads for the factorization, in `[1, 128]`. The calling
    /// thread is one of them; the triangular solves always run on the caller
    /// alone.
    pub threads: usize,
}

impl FactorOpts {
    /// Blocking used by [`FactorizeH::factorizeh`]: single-threaded, block
    /// size 32 capped by the matrix order.
    pub fn for_order(n: usize) -> Self {
        FactorOpts {
            block_size: n.clamp(1, 32),
            threads: 1,
        }
    }
}

fn validate(n: usize, opts: &FactorOpts) -> Result<()> {
    if opts.threads < 1 || opts.threads > 128 {
        return Err(CholeskyError::InvalidThreadCount {
            threads: opts.threads,
        });
    }
    if opts.block_size < 1 || opts.block_size > n {
        return Err(CholeskyError::InvalidBlockSize {
            block_size: opts.block_size,
            n,
        });
    }
    Ok(())
}

#[cfg_attr(doc, katexit::katexit)]
/// The factorization $A = R^T D R$ of a real symmetric matrix.
///
/// `factor` holds the packed upper triangular $R$ (with the in-block column
/// scaling applied by the kernel) and `signs` the diagonal $D \in
/// \\{-1, +1\\}^n$.
#[derive(Debug)]
pub struct FactorizedH<A> {
    /// Packed upper triangular factor.
    pub factor: Vec<A>,
    /// Signs of the factored diagonal.
    pub signs: Vec<A>,
    n: usize,
    block_size: usize,
}

impl<A> FactorizedH<A> {
    /// Order of the factored matrix.
    pub fn order(&self) -> usize {
        self.n
    }

    /// Block size the factor was computed with; the solves reuse it.
    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

/// Solve `A x = b` for a factored or factorizable symmetric `A`.
pub trait SolveH<A: Entry> {
    /// Solve into a fresh array.
    fn solveh<S: Data<Elem = A>>(&self, b: &ArrayBase<S, Ix1>) -> Result<Array1<A>> {
        let mut b = b.to_owned();
        self.solveh_mut(&mut b)?;
        Ok(b)
    }

    /// Solve consuming the right-hand side.
    fn solveh_into<S: DataMut<Elem = A>>(
        &self,
        mut b: ArrayBase<S, Ix1>,
    ) -> Result<ArrayBase<S, Ix1>> {
        self.solveh_mut(&mut b)?;
        Ok(b)
    }

    /// Solve in place: `b` enters as the right-hand side and leaves as the
    /// solution.
    fn solveh_mut<'a, S: DataMut<Elem = A>>(
        &self,
        b: &'a mut ArrayBase<S, Ix1>,
    ) -> Result<&'a mut ArrayBase<S, Ix1>>;
}

impl<A: Entry> SolveH<A> for FactorizedH<A> {
    fn solveh_mut<'a, S: DataMut<Elem = A>>(
        &self,
        b: &'a mut ArrayBase<S, Ix1>,
    ) -> Result<&'a mut ArrayBase<S, Ix1>> {
        if b.len() != self.n {
            return Err(CholeskyError::ShapeMismatch {
                expected: self.n,
                actual: b.len(),
            });
        }
        let rhs = b.as_slice_mut().ok_or(CholeskyError::MemoryNotCont)?;

        let mut workspace = vec![A::zero(); self.block_size * self.block_size];
        chol::solve_forward(self.n, &self.factor, rhs, &mut workspace, self.block_size)?;
        chol::solve_backward(
            self.n,
            &self.factor,
            &self.signs,
            rhs,
            &mut workspace,
            self.block_size,
        )?;
        Ok(b)
    }
}

/// Factorize a symmetric matrix, reading its upper triangle.
pub trait FactorizeH<A: Entry> {
    /// Factorize with [`FactorOpts::for_order`].
    fn factorizeh(&self) -> Result<FactorizedH<A>>;

    /// Factorize with explicit blocking.
    fn factorizeh_with(&self, opts: FactorOpts) -> Result<FactorizedH<A>>;
}

impl<A, S> FactorizeH<A> for ArrayBase<S, Ix2>
where
    A: Entry,
    S: Data<Elem = A>,
{
    fn factorizeh(&self) -> Result<FactorizedH<A>> {
        self.factorizeh_with(FactorOpts::for_order(self.nrows()))
    }

    fn factorizeh_with(&self, opts: FactorOpts) -> Result<FactorizedH<A>> {
        let mut factor = pack_upper(self)?;
        let n = self.nrows();
        validate(n, &opts)?;

        let mut signs = vec![A::one(); n];
        let mut workspace = vec![A::zero(); scratch_len(opts.block_size, opts.threads)];
        chol::factorize(
            n,
            &mut factor,
            &mut signs,
            &mut workspace,
            opts.block_size,
            opts.threads,
        )?;

        Ok(FactorizedH {
            factor,
            signs,
            n,
            block_size: opts.block_size,
        })
    }
}

impl<A, S> SolveH<A> for ArrayBase<S, Ix2>
where
    A: Entry,
    S: Data<Elem = A>,
{
    fn solveh_mut<'a, Sb: DataMut<Elem = A>>(
        &self,
        b: &'a mut ArrayBase<Sb, Ix1>,
    ) -> Result<&'a mut ArrayBase<Sb, Ix1>> {
        let f = self.factorizeh()?;
        f.solveh_mut(b)
    }
}
