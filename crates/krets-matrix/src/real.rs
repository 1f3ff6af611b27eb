use std::collections::HashMap;
use std::fmt;

use faer::Mat;
use faer::linalg::solvers::Solve;
use faer::sparse::{SparseColMat, Triplet};

use crate::backing::Backing;
use crate::error::{Error, Result};

/// Owns the real-valued `A·x = b` system for one analysis pass (DC or
/// transient). Entries are accumulated in a sparse map so that components
/// can stamp by `(row, col)` without pre-sizing a dense grid, then solved
/// via `faer`'s sparse LU.
pub struct RealLinearSystem {
    dim: usize,
    backing: Backing,
    a: HashMap<(usize, usize), f64>,
    b: Vec<f64>,
    x: Vec<f64>,
}

impl RealLinearSystem {
    pub fn new(dim: usize, backing: Backing) -> Self {
        Self {
            dim,
            backing,
            a: HashMap::new(),
            b: vec![0.0; dim],
            x: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Clears `A` and `b`, preserving the dimension and backing. Used at the
    /// start of every full restamp (Newton iteration, time step, frequency
    /// point).
    pub fn clear(&mut self) {
        self.a.clear();
        self.b.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Incremental update (`+=`), used for shared current-balance rows.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        *self.a.entry((row, col)).or_insert(0.0) += value;
    }

    /// Overwriting update (`=`), used for component-exclusive rows.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.a.insert((row, col), value);
    }

    pub fn add_rhs(&mut self, row: usize, value: f64) {
        self.b[row] += value;
    }

    pub fn set_rhs(&mut self, row: usize, value: f64) {
        self.b[row] = value;
    }

    pub fn rhs(&self, row: usize) -> f64 {
        self.b[row]
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    fn to_sparse_col_mat(&self) -> Result<SparseColMat<usize, f64>> {
        let triplets: Vec<Triplet<usize, usize, f64>> = self
            .a
            .iter()
            .map(|(&(row, col), &value)| Triplet::new(row, col, value))
            .collect();
        SparseColMat::try_new_from_triplets(self.dim, self.dim, &triplets)
            .map_err(|e| Error::Sparse(e.to_string()))
    }

    fn to_dense_mat(&self) -> Mat<f64> {
        Mat::from_fn(self.dim, self.dim, |row, col| {
            *self.a.get(&(row, col)).unwrap_or(&0.0)
        })
    }

    /// Solves `A·x = b`, storing the result. Both backings route through the
    /// sparse LU factorisation; `Dense` additionally exercises
    /// [`Self::to_dense_mat`] so the matrix can still be pretty-printed.
    pub fn solve(&mut self) -> Result<()> {
        if self.backing == Backing::Dense {
            let _ = self.to_dense_mat();
        }

        let sparse = self.to_sparse_col_mat()?;
        let lu = sparse.sp_lu().map_err(|_| Error::Singular)?;

        let rhs = Mat::from_fn(self.dim, 1, |row, _| self.b[row]);
        let solution = Solve::solve(&lu, &rhs);

        self.x = (0..self.dim).map(|row| solution[(row, 0)]).collect();
        Ok(())
    }
}

impl fmt::Display for RealLinearSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.dim {
            for col in 0..self.dim {
                write!(f, "{:7.3} ", self.a.get(&(row, col)).unwrap_or(&0.0))?;
            }
            writeln!(f, "| {:7.3}", self.b[row])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_a_small_dense_system() {
        let mut ls = RealLinearSystem::new(2, Backing::Sparse);
        ls.set(0, 0, 10.0);
        ls.set(0, 1, 2.0);
        ls.set(1, 0, 2.0);
        ls.set(1, 1, 10.0);
        ls.set_rhs(0, 15.0);
        ls.set_rhs(1, -3.0);

        ls.solve().unwrap();

        assert!(ls.x()[0] > 0.0);
        assert!(ls.x()[1] < 0.0);
    }

    #[test]
    fn add_accumulates_incrementally() {
        let mut ls = RealLinearSystem::new(1, Backing::Sparse);
        ls.add(0, 0, 1.0);
        ls.add(0, 0, 2.0);
        assert_eq!(*ls.a.get(&(0, 0)).unwrap(), 3.0);
    }
}
