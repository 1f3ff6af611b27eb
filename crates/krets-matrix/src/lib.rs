pub mod backing;
pub mod complex;
pub mod error;
pub mod real;

pub use backing::Backing;
pub use complex::ComplexLinearSystem;
pub use error::{Error, Result};
pub use real::RealLinearSystem;
