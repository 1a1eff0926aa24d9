use thiserror::Error;

pub type Result<T> = ::std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A diagonal pivot fell below the [`Entry::EPS`](crate::Entry::EPS)
    /// threshold during factorization or a triangular solve.
    #[error("singular pivot at row {index}")]
    SingularPivot { index: usize },
}

impl Error {
    /// Rebase an in-block row index onto the full matrix.
    pub(crate) fn offset(self, base: usize) -> Self {
        match self {
            Error::SingularPivot { index } => Error::SingularPivot {
                index: base + index,
            },
        }
    }
}
