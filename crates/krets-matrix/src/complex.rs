use std::collections::HashMap;
use std::fmt;

use faer::linalg::solvers::Solve;
use faer::sparse::{SparseColMat, Triplet};
use faer::{Mat, c64};

use crate::backing::Backing;
use crate::error::{Error, Result};

/// The complex-valued sibling of [`crate::RealLinearSystem`], used for AC
/// sweep analysis where every element stamps admittance/impedance phasors.
pub struct ComplexLinearSystem {
    dim: usize,
    backing: Backing,
    a: HashMap<(usize, usize), c64>,
    b: Vec<c64>,
    x: Vec<c64>,
}

impl ComplexLinearSystem {
    pub fn new(dim: usize, backing: Backing) -> Self {
        Self {
            dim,
            backing,
            a: HashMap::new(),
            b: vec![c64::new(0.0, 0.0); dim],
            x: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn clear(&mut self) {
        self.a.clear();
        self.b.iter_mut().for_each(|v| *v = c64::new(0.0, 0.0));
    }

    pub fn add(&mut self, row: usize, col: usize, value: c64) {
        *self.a.entry((row, col)).or_insert(c64::new(0.0, 0.0)) += value;
    }

    pub fn set(&mut self, row: usize, col: usize, value: c64) {
        self.a.insert((row, col), value);
    }

    pub fn add_rhs(&mut self, row: usize, value: c64) {
        self.b[row] += value;
    }

    pub fn set_rhs(&mut self, row: usize, value: c64) {
        self.b[row] = value;
    }

    pub fn rhs(&self, row: usize) -> c64 {
        self.b[row]
    }

    pub fn x(&self) -> &[c64] {
        &self.x
    }

    fn to_sparse_col_mat(&self) -> Result<SparseColMat<usize, c64>> {
        let triplets: Vec<Triplet<usize, usize, c64>> = self
            .a
            .iter()
            .map(|(&(row, col), &value)| Triplet::new(row, col, value))
            .collect();
        SparseColMat::try_new_from_triplets(self.dim, self.dim, &triplets)
            .map_err(|e| Error::Sparse(e.to_string()))
    }

    fn to_dense_mat(&self) -> Mat<c64> {
        Mat::from_fn(self.dim, self.dim, |row, col| {
            *self.a.get(&(row, col)).unwrap_or(&c64::new(0.0, 0.0))
        })
    }

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

impl fmt::Display for ComplexLinearSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.dim {
            for col in 0..self.dim {
                let value = self.a.get(&(row, col)).unwrap_or(&c64::new(0.0, 0.0));
                write!(f, "{value:7.3} ")?;
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
    fn solves_a_small_complex_system() {
        let mut ls = ComplexLinearSystem::new(2, Backing::Sparse);
        ls.set(0, 0, c64::new(10.0, 0.0));
        ls.set(0, 1, c64::new(2.0, 0.0));
        ls.set(1, 0, c64::new(2.0, 0.0));
        ls.set(1, 1, c64::new(10.0, 0.0));
        ls.set_rhs(0, c64::new(15.0, 0.0));
        ls.set_rhs(1, c64::new(-3.0, 0.0));

        ls.solve().unwrap();

        assert!(ls.x()[0].re > 0.0);
        assert!(ls.x()[1].re < 0.0);
    }
}
