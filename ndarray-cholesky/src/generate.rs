//! Generator functions for matrices and known solutions

use ndarray::*;
use num_traits::NumCast;
use rand::distr::{Distribution, StandardUniform};
use rand::prelude::*;

use chol::Entry;

/// The synthetic test matrix `A[i, j] = min(n - i, n - j)`.
///
/// Symmetric and positive definite; together with [`even_ones`] it gives a
/// solve whose exact answer is known up front.
pub fn min_matrix<A: Entry>(n: usize) -> Array2<A> {
    Array2::from_shape_fn((n, n), |(i, j)| {
        <A as NumCast>::from(n - i.max(j)).unwrap()
    })
}

/// The known answer vector: one at even indices, zero at odd ones.
pub fn even_ones<A: Entry>(n: usize) -> Array1<A> {
    Array1::from_shape_fn(n, |i| if i % 2 == 0 { A::one() } else { A::zero() })
}

/// Array of the given shape filled from the thread-local RNG.
///
/// - See [random_using] to thread an explicit RNG through instead.
pub fn random<A, D, Sh>(sh: Sh) -> Array<A, D>
where
    A: Entry,
    StandardUniform: Distribution<A>,
    D: Dimension,
    Sh: ShapeBuilder<Dim = D>,
{
    let mut rng = rand::rng();
    random_using(sh, &mut rng)
}

/// Array of the given shape filled from the supplied RNG.
pub fn random_using<A, D, Sh, R>(sh: Sh, rng: &mut R) -> Array<A, D>
where
    A: Entry,
    StandardUniform: Distribution<A>,
    D: Dimension,
    Sh: ShapeBuilder<Dim = D>,
    R: Rng,
{
    Array::from_shape_fn(sh, |_| rng.random())
}

/// Random real symmetric matrix
///
/// - See [random_symmetric_using] to thread an explicit RNG through instead.
pub fn random_symmetric<A>(n: usize) -> Array2<A>
where
    A: Entry,
    StandardUniform: Distribution<A>,
{
    let mut rng = rand::rng();
    random_symmetric_using(n, &mut rng)
}

/// Random real symmetric matrix with given RNG
///
/// - Thread-local-RNG counterpart: [random_symmetric].
pub fn random_symmetric_using<A, R>(n: usize, rng: &mut R) -> Array2<A>
where
    A: Entry,
    StandardUniform: Distribution<A>,
    R: Rng,
{
    let mut a: Array2<A> = random_using((n, n), rng);
    for i in 0..n {
        a[(i, i)] = a[(i, i)] + a[(i, i)];
        for j in (i + 1)..n {
            a[(i, j)] = a[(j, i)];
        }
    }
    a
}

/// Random symmetric positive-definite matrix
///
/// - Eigenvalues are at least 1, so the factorization cannot hit a vanishing
///   pivot.
/// - See [random_spd_using] to thread an explicit RNG through instead.
pub fn random_spd<A>(n: usize) -> Array2<A>
where
    A: Entry,
    StandardUniform: Distribution<A>,
{
    let mut rng = rand::rng();
    random_spd_using(n, &mut rng)
}

/// Random symmetric positive-definite matrix with given RNG
///
/// - Thread-local-RNG counterpart: [random_spd].
pub fn random_spd_using<A, R>(n: usize, rng: &mut R) -> Array2<A>
where
    A: Entry,
    StandardUniform: Distribution<A>,
    R: Rng,
{
    let a: Array2<A> = random_using((n, n), rng);
    Array2::eye(n) + &a.t().dot(&a)
}

/// Random symmetric indefinite matrix with given RNG
///
/// Built as `R^T D R` from a well-conditioned upper triangular `R` and a
/// diagonal of alternating signs, so the factorization succeeds and finds
/// pivots of both signs.
pub fn random_indefinite_using<A, R>(n: usize, rng: &mut R) -> Array2<A>
where
    A: Entry,
    StandardUniform: Distribution<A>,
    R: Rng,
{
    let half = <A as NumCast>::from(0.5).unwrap();
    let tenth = <A as NumCast>::from(0.1).unwrap();

    let mut r: Array2<A> = Array2::zeros((n, n));
    for i in 0..n {
        r[(i, i)] = A::one() + rng.random();
        for j in (i + 1)..n {
            r[(i, j)] = (rng.random::<A>() - half) * tenth;
        }
    }

    let d = Array1::from_shape_fn(n, |i| if i % 2 == 0 { A::one() } else { -A::one() });
    r.t().dot(&Array2::from_diag(&d)).dot(&r)
}
