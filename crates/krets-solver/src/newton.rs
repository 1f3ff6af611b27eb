//! The Newton core shared by DC, transient, and AC-sweep analysis:
//! stamp once, then iterate bias-point updates and full restamps until the
//! nonlinear residual falls under tolerance.

use krets_matrix::{ComplexLinearSystem, RealLinearSystem};
use krets_parser::assembly::VariableTable;
use krets_parser::prelude::Element;
use log::debug;

use crate::error::{Error, Result};
use crate::stamp::{AnalysisDescription, LinearSystemLike, restamp_all};
use crate::stampable::Stampable;

/// A linear system that can be factorised and whose solution can be read
/// back as real values for the diode bias-error computation. For
/// [`ComplexLinearSystem`] this takes the real part of `x`, a pragmatic
/// simplification since AC sweep combined with nonlinear devices is outside
/// this crate's tested scenarios.
pub trait AnalysisSystem: LinearSystemLike {
    fn solve(&mut self) -> krets_matrix::Result<()>;
    fn real_solution(&self) -> Vec<f64>;
}

impl AnalysisSystem for RealLinearSystem {
    fn solve(&mut self) -> krets_matrix::Result<()> {
        RealLinearSystem::solve(self)
    }
    fn real_solution(&self) -> Vec<f64> {
        self.x().to_vec()
    }
}

impl AnalysisSystem for ComplexLinearSystem {
    fn solve(&mut self) -> krets_matrix::Result<()> {
        ComplexLinearSystem::solve(self)
    }
    fn real_solution(&self) -> Vec<f64> {
        self.x().iter().map(|c| c.re).collect()
    }
}

fn diode_bias_error_sum(elements: &[Element], non_linear: &[usize], x: &[f64], vars: &VariableTable) -> f64 {
    non_linear
        .iter()
        .map(|&idx| elements[idx].dc_bias_error(x, vars).abs())
        .sum()
}

/// Runs the Newton loop against an already-stamped `ls`. Expects
/// `ls.solve()` not yet to have been called for this stamp.
pub fn solve_nonlinear<L: AnalysisSystem>(
    elements: &mut [Element],
    vars: &VariableTable,
    non_linear: &[usize],
    desc: &AnalysisDescription,
    ls: &mut L,
    max_iter: usize,
) -> Result<()> {
    ls.solve()?;

    for iteration in 0..max_iter {
        let x = ls.real_solution();
        let err = diode_bias_error_sum(elements, non_linear, &x, vars);
        let norm: f64 = x.iter().map(|v| v.abs()).sum();
        let tau = (1e-3 * norm).max(1e-6);
        debug!("newton iteration {iteration}: err={err}, tau={tau}");

        if err < tau {
            return Ok(());
        }

        for &idx in non_linear {
            elements[idx].update_state(&x, vars);
        }
        restamp_all(elements, vars, desc, ls)?;
        ls.solve()?;
    }

    Err(Error::NonConvergence(max_iter))
}
