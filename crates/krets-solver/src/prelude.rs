pub use crate::error::Error;
pub type Result<T> = core::result::Result<T, Error>;

pub use crate::circuit::{Circuit, ComponentHandle};
pub use crate::config::SolverConfig;
pub use crate::stamp::{AnalysisDescription, Mode};
pub use krets_matrix::Backing;
