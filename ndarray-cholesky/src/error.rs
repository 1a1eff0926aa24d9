//! Errors of the array-facing solver API

use ndarray::ShapeError;
use thiserror::Error;

pub type Result<T> = ::std::result::Result<T, CholeskyError>;

/// Everything the factorization and solve entry points can reject or run
/// into: configuration and shape problems caught before the kernels start,
/// and the singular-pivot failure they can surface while running.
#[derive(Debug, Error)]
pub enum CholeskyError {
    /// Only square matrices can be packed and factored
    #[error("matrix is {rows} x {cols}, expected square")]
    NotSquare { rows: usize, cols: usize },

    /// Right-hand side length differs from the matrix order
    #[error("right-hand side has {actual} entries, matrix order is {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Blocking outside `1 <= block_size <= n`
    #[error("block size {block_size} is unusable for a matrix of order {n}")]
    InvalidBlockSize { block_size: usize, n: usize },

    /// Worker-thread count outside `[1, 128]`
    #[error("thread count {threads} is outside [1, 128]")]
    InvalidThreadCount { threads: usize },

    /// The right-hand side is not contiguous, so the solves cannot run on it
    /// in place
    #[error("right-hand side memory is not contiguous")]
    MemoryNotCont,

    /// A pivot magnitude fell below the singularity threshold
    #[error(transparent)]
    Singular(#[from] chol::error::Error),

    /// Forwarded from `ndarray` when an array cannot take the required shape
    #[error(transparent)]
    Shape(#[from] ShapeError),
}
