use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Duplicate component name, or a name starting with `$`/containing `.`.
    #[error("invalid component name: {0}")]
    NameError(String),

    /// Anything the netlist parser rejected: unknown line, bad argument
    /// count, unparseable number, missing required parameter.
    #[error("netlist syntax error: {0}")]
    NetlistSyntaxError(String),

    /// A voltage source whose endpoints are both constants but disagree
    /// with its declared value beyond `1e-6`.
    #[error(
        "voltage source '{name}' is inconsistent: node1 - node2 = {actual}, expected {expected}"
    )]
    InconsistentConstants {
        name: String,
        actual: f64,
        expected: f64,
    },

    /// `get_variable` for a name not present in the variable table.
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// Dense singular matrix, or sparse factorisation failure.
    #[error("linear solve failed: {0}")]
    LinearSolveError(#[from] krets_matrix::Error),

    /// The Newton loop exceeded `max_iter` without converging.
    #[error("Newton iteration did not converge within {0} iterations")]
    NonConvergence(usize),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<krets_parser::prelude::Error> for Error {
    fn from(e: krets_parser::prelude::Error) -> Self {
        match e {
            krets_parser::prelude::Error::DuplicateName(name) => Error::NameError(name),
            krets_parser::prelude::Error::InconsistentConstants {
                name,
                actual,
                expected,
            } => Error::InconsistentConstants {
                name,
                actual,
                expected,
            },
            other => Error::NetlistSyntaxError(other.to_string()),
        }
    }
}
