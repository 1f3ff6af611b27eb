use krets_matrix::Backing;

/// Configuration shared by every analysis entry point: which linear-system
/// backend to factorise with, and how many Newton iterations to allow
/// before giving up.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    pub backing: Backing,
    pub maximum_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            backing: Backing::Sparse,
            maximum_iterations: 300,
        }
    }
}
