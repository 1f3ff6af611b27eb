//! The analysis-mode value and the scalar-agnostic linear-system contract
//! that lets one `Stampable` implementation drive either a real
//! system (Dc, Transient) or a complex one (AcSweep).

use faer::c64;
use krets_matrix::{ComplexLinearSystem, RealLinearSystem};
use krets_parser::prelude::Element;

use crate::error::Result;

/// Which analysis is currently stamping the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Dc,
    Transient,
    AcSweep,
}

/// The per-step parameters every stamp call needs, beyond the component's
/// own state: the current mode, the transient step size, and the angular
/// frequency of an AC sweep point.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisDescription {
    pub mode: Mode,
    pub time_step: f64,
    pub omega: f64,
}

impl AnalysisDescription {
    pub fn dc() -> Self {
        Self {
            mode: Mode::Dc,
            time_step: 0.0,
            omega: 0.0,
        }
    }

    pub fn transient(time_step: f64) -> Self {
        Self {
            mode: Mode::Transient,
            time_step,
            omega: 0.0,
        }
    }

    pub fn ac_sweep(omega: f64) -> Self {
        Self {
            mode: Mode::AcSweep,
            time_step: 0.0,
            omega,
        }
    }
}

/// A linear system that can be stamped without caring whether its scalars
/// are real or complex. Real-only callers pass `im = 0.0`; `RealLinearSystem`
/// simply drops it.
pub trait LinearSystemLike {
    fn add(&mut self, row: usize, col: usize, re: f64, im: f64);
    fn set(&mut self, row: usize, col: usize, re: f64, im: f64);
    fn add_rhs(&mut self, row: usize, re: f64, im: f64);
    fn set_rhs(&mut self, row: usize, re: f64, im: f64);
    fn clear(&mut self);
}

impl LinearSystemLike for RealLinearSystem {
    fn add(&mut self, row: usize, col: usize, re: f64, _im: f64) {
        RealLinearSystem::add(self, row, col, re);
    }
    fn set(&mut self, row: usize, col: usize, re: f64, _im: f64) {
        RealLinearSystem::set(self, row, col, re);
    }
    fn add_rhs(&mut self, row: usize, re: f64, _im: f64) {
        RealLinearSystem::add_rhs(self, row, re);
    }
    fn set_rhs(&mut self, row: usize, re: f64, _im: f64) {
        RealLinearSystem::set_rhs(self, row, re);
    }
    fn clear(&mut self) {
        RealLinearSystem::clear(self);
    }
}

impl LinearSystemLike for ComplexLinearSystem {
    fn add(&mut self, row: usize, col: usize, re: f64, im: f64) {
        ComplexLinearSystem::add(self, row, col, c64::new(re, im));
    }
    fn set(&mut self, row: usize, col: usize, re: f64, im: f64) {
        ComplexLinearSystem::set(self, row, col, c64::new(re, im));
    }
    fn add_rhs(&mut self, row: usize, re: f64, im: f64) {
        ComplexLinearSystem::add_rhs(self, row, c64::new(re, im));
    }
    fn set_rhs(&mut self, row: usize, re: f64, im: f64) {
        ComplexLinearSystem::set_rhs(self, row, c64::new(re, im));
    }
    fn clear(&mut self) {
        ComplexLinearSystem::clear(self);
    }
}

/// Clears `ls` and stamps every non-disabled element's shared then exclusive
/// rows, in declared order.
pub fn restamp_all(
    elements: &[Element],
    vars: &krets_parser::assembly::VariableTable,
    desc: &AnalysisDescription,
    ls: &mut dyn LinearSystemLike,
) -> Result<()> {
    use crate::stampable::Stampable;

    ls.clear();
    for element in elements {
        if element.is_disabled() {
            continue;
        }
        element.stamp_shared(vars, desc, ls);
        element.stamp_exclusive(vars, desc, ls);
    }
    Ok(())
}
