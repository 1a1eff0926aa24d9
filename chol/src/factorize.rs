//! Parallel blocked factorization
//!
//! The packed matrix is factored one block row at a time. Within an outer
//! step over the diagonal block at `i`, work is split into three phases
//! separated by a shared barrier:
//!
//! 1. every thread applies the Schur updates of the already-factored block
//!    rows to its stripe of block columns `j = i, i+B, ...` (round-robin over
//!    threads),
//! 2. thread 0 factors the diagonal block and inverts it into the shared
//!    `me` block,
//! 3. every thread scales its stripe of trailing blocks `j > i` by the
//!    inverted diagonal block, after taking a private copy of `me`.
//!
//! Failures can only surface in phase 2; thread 0 raises a shared flag that
//! all threads observe right after the second barrier and unwind on.

use std::marker::PhantomData;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;

use crate::cholesky::{cholesky_block, inverse_upper_triangle_with_diag};
use crate::error::*;
use crate::gemm::{gemm_subtract_with_diag, gemm_transposed};
use crate::packed::{entry_offset, packed_len, row_start};
use crate::workspace::{split_scratch, ThreadScratch};
use crate::Entry;

/// A slice shared across the worker threads through a raw pointer.
///
/// The factorizer writes the packed matrix from several threads at once, but
/// always at disjoint positions: phase 1 and phase 3 write block-column
/// stripes that partition the current block row, phase 2 writes are thread-0
/// only, and the barrier orders the phases. Every access materializes a
/// reference covering exactly the row segments of one block, so concurrently
/// live references never overlap.
struct SharedSlice<'a, A> {
    ptr: *mut A,
    len: usize,
    _marker: PhantomData<&'a mut [A]>,
}

unsafe impl<A: Entry> Send for SharedSlice<'_, A> {}
unsafe impl<A: Entry> Sync for SharedSlice<'_, A> {}

impl<'a, A: Entry> SharedSlice<'a, A> {
    fn new(slice: &'a mut [A]) -> Self {
        SharedSlice {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
            _marker: PhantomData,
        }
    }

    /// # Safety
    /// No other thread may be writing `start..start + len` while the
    /// returned reference lives.
    unsafe fn slice(&self, start: usize, len: usize) -> &[A] {
        debug_assert!(start + len <= self.len);
        std::slice::from_raw_parts(self.ptr.add(start), len)
    }

    /// # Safety
    /// No other thread may be accessing `start..start + len` while the
    /// returned reference lives.
    #[allow(clippy::mut_from_ref)]
    unsafe fn slice_mut(&self, start: usize, len: usize) -> &mut [A] {
        debug_assert!(start + len <= self.len);
        std::slice::from_raw_parts_mut(self.ptr.add(start), len)
    }

    /// # Safety
    /// The packed row segments of the `n x m` block at `(row, col)` must not
    /// be written by any other thread during the call.
    unsafe fn gather_block(
        &self,
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
            debug_assert!(k + m <= self.len);
            ptr::copy_nonoverlapping(self.ptr.add(k) as *const A, dst.as_mut_ptr().add(i * m), m);
            k += size - (row + i) - 1;
        }
    }

    /// # Safety
    /// The packed row segments of the `n x m` block at `(row, col)` must not
    /// be accessed by any other thread during the call.
    unsafe fn scatter_block(
        &self,
        row: usize,
        col: usize,
        size: usize,
        n: usize,
        m: usize,
        src: &[A],
    ) {
        let mut k = entry_offset(row, col, size);
        for i in 0..n {
            debug_assert!(k + m <= self.len);
            ptr::copy_nonoverlapping(src.as_ptr().add(i * m), self.ptr.add(k), m);
            k += size - (row + i) - 1;
        }
    }

    /// # Safety
    /// As for [`Self::gather_block`], over the diagonal block at `start`.
    unsafe fn gather_diag(&self, start: usize, size: usize, m: usize, dst: &mut [A]) {
        dst[..m * m].fill(A::zero());
        let mut k = row_start(start, size);
        for i in 0..m {
            let len = m - i;
            debug_assert!(k + len <= self.len);
            ptr::copy_nonoverlapping(
                self.ptr.add(k) as *const A,
                dst.as_mut_ptr().add(i * m + i),
                len,
            );
            k += size - (start + i);
        }
    }

    /// # Safety
    /// As for [`Self::scatter_block`], over the diagonal block at `start`.
    unsafe fn scatter_diag(&self, start: usize, size: usize, m: usize, src: &[A]) {
        let mut k = row_start(start, size);
        for i in 0..m {
            let len = m - i;
            debug_assert!(k + len <= self.len);
            ptr::copy_nonoverlapping(src.as_ptr().add(i * m + i), self.ptr.add(k), len);
            k += size - (start + i);
        }
    }
}

/// State shared by all workers of one factorization.
struct Ctx<'a, A: Entry> {
    size: usize,
    block_size: usize,
    threads: usize,
    matrix: SharedSlice<'a, A>,
    signs: SharedSlice<'a, A>,
    me: SharedSlice<'a, A>,
    barrier: Barrier,
    failed: AtomicUsize,
}

#[cfg_attr(doc, katexit::katexit)]
/// Factor a packed symmetric matrix in place, $A = R^T D R$.
///
/// `a` holds the packed upper triangle of a symmetric matrix of order
/// `size`; on success it holds the packed upper triangular factor and
/// `signs[..size]` the diagonal signs. `workspace` provides at least
/// [`scratch_len(block_size, threads)`](crate::workspace::scratch_len)
/// entries of scratch; no allocation happens past this point. The calling
/// thread becomes worker 0 and `threads - 1` further workers are spawned for
/// the duration of the call.
///
/// On failure the matrix and the sign vector are left in an unspecified
/// state and should be discarded.
pub fn factorize<A: Entry>(
    size: usize,
    a: &mut [A],
    signs: &mut [A],
    workspace: &mut [A],
    block_size: usize,
    threads: usize,
) -> Result<()> {
    assert!(block_size >= 1, "block size must be positive");
    assert!(threads >= 1, "thread count must be positive");
    assert!(a.len() >= packed_len(size));
    assert!(signs.len() >= size);

    let (me, quads) = split_scratch(workspace, block_size, threads);

    let ctx = Ctx {
        size,
        block_size,
        threads,
        matrix: SharedSlice::new(&mut a[..packed_len(size)]),
        signs: SharedSlice::new(&mut signs[..size]),
        me: SharedSlice::new(me),
        barrier: Barrier::new(threads),
        failed: AtomicUsize::new(0),
    };

    let mut quads = quads.into_iter();
    let lead = quads.next().expect("at least one worker");

    thread::scope(|s| {
        for (offset, quad) in quads.enumerate() {
            let ctx = &ctx;
            s.spawn(move || {
                let _ = worker(ctx, offset + 1, quad);
            });
        }
        worker(&ctx, 0, lead)
    })
}

fn worker<A: Entry>(ctx: &Ctx<'_, A>, thread_id: usize, scratch: ThreadScratch<'_, A>) -> Result<()> {
    let ThreadScratch { ma, mb, mc, md } = scratch;
    let size = ctx.size;
    let bs = ctx.block_size;
    let stride = ctx.threads * bs;
    let dim = |start: usize| bs.min(size - start);

    // Only thread 0 can observe a kernel failure; everyone else unwinds on
    // the shared flag and the caller inspects thread 0's result alone.
    let mut failure = None;

    let mut i = 0;
    while i < size {
        let ni = dim(i);

        // Phase 1: fold the factored block rows above into this thread's
        // stripe of block row i.
        let mut j = i + thread_id * bs;
        while j < size {
            let mj = dim(j);
            // SAFETY: block (i, j) belongs to this thread's stripe; the
            // blocks read below it were finalized in earlier outer steps.
            unsafe {
                if j == i {
                    ctx.matrix.gather_diag(i, size, ni, mc);
                } else {
                    ctx.matrix.gather_block(i, j, size, ni, mj, mc);
                }

                let mut k = 0;
                while k < i {
                    let nk = dim(k);
                    ctx.matrix.gather_block(k, i, size, nk, ni, ma);
                    ctx.matrix.gather_block(k, j, size, nk, mj, mb);
                    gemm_subtract_with_diag(nk, ni, mj, ma, mb, ctx.signs.slice(k, nk), mc);
                    k += bs;
                }

                if j == i {
                    ctx.matrix.scatter_diag(i, size, ni, mc);
                } else {
                    ctx.matrix.scatter_block(i, j, size, ni, mj, mc);
                }
            }
            j += stride;
        }

        ctx.barrier.wait();

        // Phase 2: thread 0 factors the diagonal block and inverts it into
        // the shared block.
        if thread_id == 0 {
            // SAFETY: between the two barriers only thread 0 touches the
            // diagonal block, this block row's sign segment and `me`.
            unsafe {
                ctx.matrix.gather_diag(i, size, ni, mb);
                let d = ctx.signs.slice_mut(i, ni);
                let factored = cholesky_block(ni, mb, d);
                ctx.matrix.scatter_diag(i, size, ni, mb);
                match factored {
                    Err(e) => {
                        failure = Some(e.offset(i));
                        ctx.failed.store(1, Ordering::Relaxed);
                    }
                    Ok(()) => {
                        let me = ctx.me.slice_mut(0, ni * ni);
                        if let Err(e) = inverse_upper_triangle_with_diag(ni, mb, d, me) {
                            failure = Some(e.offset(i));
                            ctx.failed.store(2, Ordering::Relaxed);
                        }
                    }
                }
            }
        }

        ctx.barrier.wait();

        if ctx.failed.load(Ordering::Relaxed) != 0 {
            return match failure {
                Some(e) => Err(e),
                None => Ok(()),
            };
        }

        // SAFETY: `me` is complete and no one writes it until the next outer
        // step's phase 2, which is behind another barrier.
        md[..ni * ni].copy_from_slice(unsafe { ctx.me.slice(0, ni * ni) });

        // Phase 3: scale the trailing blocks of row i by the inverted
        // diagonal block.
        let mut j = i + bs + thread_id * bs;
        while j < size {
            let mj = dim(j);
            // SAFETY: block (i, j) belongs to this thread's phase 3 stripe.
            unsafe {
                ctx.matrix.gather_block(i, j, size, ni, mj, mb);
                gemm_transposed(ni, ni, mj, md, mb, mc);
                ctx.matrix.scatter_block(i, j, size, ni, mj, mc);
            }
            j += stride;
        }

        ctx.barrier.wait();
        i += bs;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::scratch_len;

    fn factor(size: usize, packed: &[f64], bs: usize, threads: usize) -> Result<(Vec<f64>, Vec<f64>)> {
        let mut a = packed.to_vec();
        let mut d = vec![0.0; size];
        let mut ws = vec![0.0; scratch_len(bs, threads)];
        factorize(size, &mut a, &mut d, &mut ws, bs, threads)?;
        Ok((a, d))
    }

    #[test]
    fn blocked_matches_classic_factor() {
        // [[4,12,-16],[12,37,-43],[-16,-43,98]] packed by upper rows
        let packed = [4.0, 12.0, -16.0, 37.0, -43.0, 98.0];
        for threads in [1, 2, 3] {
            let (r, d) = factor(3, &packed, 2, threads).unwrap();
            assert_eq!(d, [1.0, 1.0, 1.0]);
            let want = [2.0, 6.0, -8.0, 1.0, 5.0, 3.0];
            for (got, want) in r.iter().zip(&want) {
                assert!((got - want).abs() < 1e-12, "{got} vs {want}");
            }
        }
    }

    #[test]
    fn signs_survive_diagonal_indefinite() {
        let packed = [1.0, 0.0, 0.0, -1.0, 0.0, 1.0];
        let (r, d) = factor(3, &packed, 2, 2).unwrap();
        assert_eq!(d, [1.0, -1.0, 1.0]);
        assert_eq!(r, [1.0, 0.0, 0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn zero_leading_pivot_fails() {
        let packed = [0.0, 1.0, 0.0];
        assert_eq!(
            factor(2, &packed, 1, 1).unwrap_err(),
            Error::SingularPivot { index: 0 }
        );
        assert_eq!(
            factor(2, &packed, 1, 2).unwrap_err(),
            Error::SingularPivot { index: 0 }
        );
    }

    #[test]
    fn thread_count_does_not_change_the_factor() {
        // trailing edge: 7 is not a multiple of the block size
        let size = 7;
        let mut packed = Vec::new();
        for i in 0..size {
            for j in i..size {
                packed.push((size - j) as f64);
            }
        }
        let (r1, d1) = factor(size, &packed, 3, 1).unwrap();
        for threads in [2, 4, 8] {
            let (r, d) = factor(size, &packed, 3, threads).unwrap();
            assert_eq!(r, r1);
            assert_eq!(d, d1);
        }
    }
}
