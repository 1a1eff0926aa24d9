//! Blocked sign-aware CHOLesky kernels
//!
//! A real symmetric matrix of order `n` is held as its packed upper triangle
//! (row major, `n * (n + 1) / 2` entries) and factored block by block into an
//! upper triangular factor and a diagonal sign vector, so that symmetric
//! indefinite matrices are accepted as long as no pivot vanishes. The
//! factorization is parallelized over OS threads joined by a barrier; the two
//! triangular solves run single-threaded.
//!
//! This crate deliberately knows nothing about `ndarray`; everything works on
//! plain slices. See the `ndarray-cholesky` crate for the array-facing API.

pub mod cholesky;
pub mod error;
pub mod factorize;
pub mod gemm;
pub mod packed;
pub mod solve;
pub mod triangular;
pub mod workspace;

pub use self::cholesky::*;
pub use self::factorize::*;
pub use self::gemm::*;
pub use self::packed::*;
pub use self::solve::*;
pub use self::triangular::*;
pub use self::workspace::*;

use num_traits::Float;
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

/// Scalar types the kernels operate on.
///
/// The sign-aware factorization needs an ordered real field, so only real
/// floating point types qualify.
pub trait Entry:
    Float + AddAssign + SubAssign + MulAssign + DivAssign + Send + Sync + 'static
{
    /// Pivot magnitudes below this threshold are treated as singular.
    const EPS: Self;
}

impl Entry for f64 {
    const EPS: Self = 1e-16;
}

impl Entry for f32 {
    const EPS: Self = 1e-7;
}
