use thiserror::Error;

/// Failures that can occur while factorising or solving `A·x = b`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("linear system is singular or ill-conditioned")]
    Singular,
    #[error("sparse factorisation failed: {0}")]
    Sparse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
