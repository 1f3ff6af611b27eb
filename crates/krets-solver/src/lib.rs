pub mod circuit;
pub mod config;
pub mod error;
pub mod newton;
pub mod prelude;
pub mod stamp;
pub mod stampable;
