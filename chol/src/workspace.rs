//! Scratch workspace layout for the parallel factorizer
//!
//! The factorizer works on one contiguous caller-provided buffer so that no
//! allocation happens once the workers are running. The buffer starts with a
//! single shared block `me` (the inverted diagonal block of the current outer
//! step, written by thread 0 only) followed by four private blocks per
//! thread:
//!
//! ```text
//! [ me | ma_0 mb_0 mc_0 md_0 | ma_1 mb_1 mc_1 md_1 | ... ]
//! ```
//!
//! Every block is `block_size^2` entries, also at the trailing edge where the
//! kernels use fewer cells. The per-thread quads are split off with
//! `split_at_mut`, so their disjointness is checked by the borrow rules; only
//! `me` crosses threads.

use crate::Entry;

/// Dense scratch blocks private to one worker thread.
pub(crate) struct ThreadScratch<'a, A> {
    pub ma: &'a mut [A],
    pub mb: &'a mut [A],
    pub mc: &'a mut [A],
    pub md: &'a mut [A],
}

/// Scratch blocks per worker thread.
pub const BLOCKS_PER_THREAD: usize = 4;

/// Scratch length (in entries) required by
/// [`factorize`](crate::factorize::factorize) for the given blocking.
///
/// The solves get by with the first `block_size^2` entries of the same
/// buffer.
pub fn scratch_len(block_size: usize, threads: usize) -> usize {
    let bb = block_size * block_size;
    bb + BLOCKS_PER_THREAD * threads * bb
}

/// Split a scratch buffer into the shared `me` block and one quad of private
/// blocks per thread.
pub(crate) fn split_scratch<A: Entry>(
    workspace: &mut [A],
    block_size: usize,
    threads: usize,
) -> (&mut [A], Vec<ThreadScratch<'_, A>>) {
    let bb = block_size * block_size;
    assert!(workspace.len() >= scratch_len(block_size, threads));

    let (me, mut rest) = workspace.split_at_mut(bb);
    let mut quads = Vec::with_capacity(threads);
    for _ in 0..threads {
        let (quad, tail) = rest.split_at_mut(BLOCKS_PER_THREAD * bb);
        let (ma, quad) = quad.split_at_mut(bb);
        let (mb, quad) = quad.split_at_mut(bb);
        let (mc, md) = quad.split_at_mut(bb);
        quads.push(ThreadScratch { ma, mb, mc, md });
        rest = tail;
    }

    (me, quads)
}
