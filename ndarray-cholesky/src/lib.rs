//! The `ndarray-cholesky` crate solves dense real symmetric linear systems
//! for [`ndarray`](https://github.com/rust-ndarray/ndarray)'s `ArrayBase`
//! using a blocked, sign-aware Cholesky factorization that runs on plain
//! worker threads, with no LAPACK backend required.
//!
//! The matrix is packed into upper-triangular storage and factored as
//! `A = R^T D R` with `D` a diagonal of signs, so symmetric indefinite
//! matrices are accepted as long as no pivot vanishes. The numerical kernels
//! live in the [`chol`] crate and work on plain slices; this crate adds the
//! array-facing traits, generators and reporting utilities.
//!
//! Usage
//! ------
//! Factor once, solve many times:
//!
//! ```
//! use ndarray::*;
//! use ndarray_cholesky::*;
//!
//! let a: Array2<f64> = min_matrix(10);
//! let b: Array1<f64> = a.dot(&even_ones::<f64>(10));
//! let f = a.factorizeh().unwrap();
//! let x = f.solveh(&b).unwrap();
//! assert_l2_close!(&x, &even_ones::<f64>(10), 1e-9);
//! ```
//!
//! Pick the blocking and the worker-thread count explicitly with
//! [`FactorOpts`]:
//!
//! ```
//! use ndarray::*;
//! use ndarray_cholesky::*;
//!
//! let a: Array2<f64> = min_matrix(64);
//! let f = a
//!     .factorizeh_with(FactorOpts {
//!         block_size: 8,
//!         threads: 4,
//!     })
//!     .unwrap();
//! ```

pub mod assert;
pub mod convert;
pub mod error;
pub mod generate;
pub mod norm;
pub mod solveh;

pub use crate::assert::*;
pub use crate::convert::*;
pub use crate::generate::*;
pub use crate::norm::*;
pub use crate::solveh::*;

pub use chol::Entry;
