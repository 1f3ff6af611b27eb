/// Selects how a [`crate::RealLinearSystem`] / [`crate::ComplexLinearSystem`]
/// is factorised. Both variants solve through `faer`'s sparse LU; `Dense`
/// additionally keeps a materialised dense matrix around for display and
/// debugging, since this workspace has no separate dense-direct solve path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backing {
    Dense,
    #[default]
    Sparse,
}
