//! Per-variant element stamping: how each component contributes to
//! the node current-balance rows (`stamp_shared`) and its own auxiliary
//! equation rows (`stamp_exclusive`), plus nonlinear bias tracking for the
//! Newton loop.

use krets_parser::assembly::VariableTable;
use krets_parser::elements::{
    capacitor::Capacitor, diode::Diode, inductor::Inductor, resistor::Resistor,
    voltage_generator::VoltageGenerator, voltage_source::VoltageSource,
};
use krets_parser::node::Node;
use krets_parser::prelude::Element;

use crate::stamp::{AnalysisDescription, LinearSystemLike, Mode};

/// A component's contribution to the stamped linear system, across all
/// three analysis modes. Default `update_state`/`dc_bias_error` suit linear,
/// state-free components (resistors, VS/VG).
pub trait Stampable {
    fn stamp_shared(
        &self,
        vars: &VariableTable,
        desc: &AnalysisDescription,
        ls: &mut dyn LinearSystemLike,
    );
    fn stamp_exclusive(
        &self,
        vars: &VariableTable,
        desc: &AnalysisDescription,
        ls: &mut dyn LinearSystemLike,
    );

    fn update_state(&mut self, _x: &[f64], _vars: &VariableTable) {}
    fn dc_bias_error(&self, _x: &[f64], _vars: &VariableTable) -> f64 {
        0.0
    }
}

/// Resolves a terminal to a variable index, or `None` if it's a fixed
/// constant (the caller then reaches for [`const_value`] instead).
fn term(node: &Node, vars: &VariableTable) -> Option<usize> {
    vars.index_of_node(node)
}

fn const_value(node: &Node) -> f64 {
    match node {
        Node::Const(value) => *value,
        Node::Var(name) => unreachable!("node '{name}' is not resolved to a constant"),
    }
}

/// Reads a terminal's present value: `x[idx]` if it's a live variable,
/// otherwise its fixed constant.
fn value_of(node: &Node, vars: &VariableTable, x: &[f64]) -> f64 {
    match term(node, vars) {
        Some(idx) => x[idx],
        None => const_value(node),
    }
}

/// Stamps a single aux-row term `(re + im*j) * node`: directly into `A` if
/// `node` is a live variable, or folded into `b` with the sign flipped if
/// it's a fixed constant. Only ever touches row `row` of `b`, never the
/// whole vector.
fn stamp_term(
    ls: &mut dyn LinearSystemLike,
    row: usize,
    node: &Node,
    vars: &VariableTable,
    re: f64,
    im: f64,
) {
    match term(node, vars) {
        Some(idx) => ls.set(row, idx, re, im),
        None => {
            let c = const_value(node);
            ls.add_rhs(row, -re * c, -im * c);
        }
    }
}

fn current_index(name: &str, vars: &VariableTable) -> usize {
    vars.index_of(&format!("{name}.current"))
        .unwrap_or_else(|| panic!("missing current variable for '{name}'"))
}

fn internal_index(name: &str, vars: &VariableTable) -> usize {
    vars.index_of(&format!("{name}.internal_node"))
        .unwrap_or_else(|| panic!("missing internal node for '{name}'"))
}

impl Stampable for Resistor {
    fn stamp_shared(
        &self,
        vars: &VariableTable,
        _desc: &AnalysisDescription,
        ls: &mut dyn LinearSystemLike,
    ) {
        let g = 1.0 / self.value;
        match (term(&self.plus, vars), term(&self.minus, vars)) {
            (Some(v1), Some(v2)) => {
                ls.add(v1, v1, g, 0.0);
                ls.add(v2, v2, g, 0.0);
                ls.add(v1, v2, -g, 0.0);
                ls.add(v2, v1, -g, 0.0);
            }
            (Some(v1), None) => {
                ls.add(v1, v1, g, 0.0);
                ls.add_rhs(v1, g * const_value(&self.minus), 0.0);
            }
            (None, Some(v2)) => {
                ls.add(v2, v2, g, 0.0);
                ls.add_rhs(v2, g * const_value(&self.plus), 0.0);
            }
            (None, None) => {}
        }
    }

    fn stamp_exclusive(
        &self,
        _vars: &VariableTable,
        _desc: &AnalysisDescription,
        _ls: &mut dyn LinearSystemLike,
    ) {
    }
}

impl Stampable for VoltageSource {
    fn stamp_shared(
        &self,
        vars: &VariableTable,
        _desc: &AnalysisDescription,
        ls: &mut dyn LinearSystemLike,
    ) {
        let i = current_index(&self.name, vars);
        if let Some(v1) = term(&self.plus, vars) {
            ls.add(v1, i, -1.0, 0.0);
        }
        if let Some(v2) = term(&self.minus, vars) {
            ls.add(v2, i, 1.0, 0.0);
        }
    }

    fn stamp_exclusive(
        &self,
        vars: &VariableTable,
        _desc: &AnalysisDescription,
        ls: &mut dyn LinearSystemLike,
    ) {
        // `disabled` sources never reach here; both terminals are still live
        // variables.
        let i = current_index(&self.name, vars);
        if let Some(v1) = term(&self.plus, vars) {
            ls.set(i, v1, 1.0, 0.0);
        }
        if let Some(v2) = term(&self.minus, vars) {
            ls.set(i, v2, -1.0, 0.0);
        }
        ls.set_rhs(i, self.value, 0.0);
    }
}

impl Stampable for VoltageGenerator {
    fn stamp_shared(
        &self,
        vars: &VariableTable,
        _desc: &AnalysisDescription,
        ls: &mut dyn LinearSystemLike,
    ) {
        let i = current_index(&self.name, vars);
        if let Some(v1) = term(&self.plus, vars) {
            ls.add(v1, i, -1.0, 0.0);
        }
        if let Some(v2) = term(&self.minus, vars) {
            ls.add(v2, i, 1.0, 0.0);
        }
    }

    fn stamp_exclusive(
        &self,
        vars: &VariableTable,
        _desc: &AnalysisDescription,
        ls: &mut dyn LinearSystemLike,
    ) {
        let i = current_index(&self.name, vars);
        ls.set_rhs(i, self.value, 0.0);
        stamp_term(ls, i, &self.plus, vars, 1.0, 0.0);
        stamp_term(ls, i, &self.minus, vars, -1.0, 0.0);
    }
}

impl Stampable for Diode {
    fn stamp_shared(
        &self,
        vars: &VariableTable,
        _desc: &AnalysisDescription,
        ls: &mut dyn LinearSystemLike,
    ) {
        let i = current_index(&self.name, vars);
        if let Some(v1) = term(&self.plus, vars) {
            ls.add(v1, i, 1.0, 0.0);
        }
        if let Some(v2) = term(&self.minus, vars) {
            ls.add(v2, i, -1.0, 0.0);
        }
    }

    fn stamp_exclusive(
        &self,
        vars: &VariableTable,
        _desc: &AnalysisDescription,
        ls: &mut dyn LinearSystemLike,
    ) {
        let i = current_index(&self.name, vars);
        let v_int = internal_index(&self.name, vars);

        let i_bias = self.i0 * (self.m * (self.v_bias - self.v0)).exp();
        let g_d = self.m * i_bias;
        let v_off = self.v_bias - i_bias / g_d;

        ls.set(v_int, i, -1.0, 0.0);
        ls.set(v_int, v_int, g_d, 0.0);
        stamp_term(ls, v_int, &self.minus, vars, -g_d, 0.0);

        ls.set(i, v_int, -1.0, 0.0);
        match term(&self.plus, vars) {
            Some(v1) => {
                ls.set(i, v1, 1.0, 0.0);
                ls.set_rhs(i, v_off, 0.0);
            }
            None => ls.set_rhs(i, v_off - const_value(&self.plus), 0.0),
        }
    }

    fn update_state(&mut self, x: &[f64], vars: &VariableTable) {
        let v = value_of(&self.plus, vars, x) - value_of(&self.minus, vars, x);
        if v > self.v_bias + 0.3 {
            self.v_bias += 0.3;
        } else if v < self.v_bias - 0.3 {
            self.v_bias -= 0.3;
        } else {
            self.v_bias = v;
        }
    }

    fn dc_bias_error(&self, x: &[f64], vars: &VariableTable) -> f64 {
        let v = value_of(&self.plus, vars, x) - value_of(&self.minus, vars, x);
        let i = current_index(&self.name, vars);
        self.i0 * (self.m * (v - self.v0)).exp() - x[i]
    }
}

impl Stampable for Capacitor {
    fn stamp_shared(
        &self,
        vars: &VariableTable,
        _desc: &AnalysisDescription,
        ls: &mut dyn LinearSystemLike,
    ) {
        let i = current_index(&self.name, vars);
        if let Some(v1) = term(&self.plus, vars) {
            ls.add(v1, i, 1.0, 0.0);
        }
        if let Some(v2) = term(&self.minus, vars) {
            ls.add(v2, i, -1.0, 0.0);
        }
    }

    fn stamp_exclusive(
        &self,
        vars: &VariableTable,
        desc: &AnalysisDescription,
        ls: &mut dyn LinearSystemLike,
    ) {
        let i = current_index(&self.name, vars);
        match desc.mode {
            Mode::Transient => {
                let h = desc.time_step / (2.0 * self.value);
                stamp_term(ls, i, &self.plus, vars, 1.0, 0.0);
                stamp_term(ls, i, &self.minus, vars, -1.0, 0.0);
                ls.set(i, i, -h, 0.0);
                ls.add_rhs(i, h * self.i_cap + self.v_cap, 0.0);
            }
            Mode::AcSweep => {
                let beta = desc.omega * self.value;
                stamp_term(ls, i, &self.plus, vars, 0.0, beta);
                stamp_term(ls, i, &self.minus, vars, 0.0, -beta);
                ls.set(i, i, -1.0, 0.0);
            }
            Mode::Dc => {
                ls.set(i, i, 1.0, 0.0);
                ls.set_rhs(i, 0.0, 0.0);
            }
        }
    }

    fn update_state(&mut self, x: &[f64], vars: &VariableTable) {
        self.v_cap = value_of(&self.plus, vars, x) - value_of(&self.minus, vars, x);
        self.i_cap = x[current_index(&self.name, vars)];
    }
}

impl Stampable for Inductor {
    fn stamp_shared(
        &self,
        vars: &VariableTable,
        _desc: &AnalysisDescription,
        ls: &mut dyn LinearSystemLike,
    ) {
        let i = current_index(&self.name, vars);
        if let Some(v1) = term(&self.plus, vars) {
            ls.add(v1, i, 1.0, 0.0);
        }
        if let Some(v2) = term(&self.minus, vars) {
            ls.add(v2, i, -1.0, 0.0);
        }
    }

    fn stamp_exclusive(
        &self,
        vars: &VariableTable,
        desc: &AnalysisDescription,
        ls: &mut dyn LinearSystemLike,
    ) {
        let i = current_index(&self.name, vars);
        match desc.mode {
            Mode::Transient => {
                let h = desc.time_step / (2.0 * self.value);
                stamp_term(ls, i, &self.plus, vars, h, 0.0);
                stamp_term(ls, i, &self.minus, vars, -h, 0.0);
                ls.set(i, i, -1.0, 0.0);
                ls.add_rhs(i, -h * self.v_l - self.i_l, 0.0);
            }
            Mode::AcSweep => {
                let gamma_im = -1.0 / (desc.omega * self.value);
                stamp_term(ls, i, &self.plus, vars, 0.0, gamma_im);
                stamp_term(ls, i, &self.minus, vars, 0.0, -gamma_im);
                ls.set(i, i, -1.0, 0.0);
            }
            Mode::Dc => {
                // Short circuit: writing only to this row of `b`, never the
                // whole vector.
                ls.set_rhs(i, 0.0, 0.0);
                stamp_term(ls, i, &self.plus, vars, 1.0, 0.0);
                stamp_term(ls, i, &self.minus, vars, -1.0, 0.0);
            }
        }
    }

    fn update_state(&mut self, x: &[f64], vars: &VariableTable) {
        self.v_l = value_of(&self.plus, vars, x) - value_of(&self.minus, vars, x);
        self.i_l = x[current_index(&self.name, vars)];
    }
}

macro_rules! dispatch {
    ($self:expr, $method:ident($($args:expr),*)) => {
        match $self {
            Element::Resistor(e) => e.$method($($args),*),
            Element::VoltageSource(e) => e.$method($($args),*),
            Element::VoltageGenerator(e) => e.$method($($args),*),
            Element::Diode(e) => e.$method($($args),*),
            Element::Capacitor(e) => e.$method($($args),*),
            Element::Inductor(e) => e.$method($($args),*),
        }
    };
}

impl Stampable for Element {
    fn stamp_shared(
        &self,
        vars: &VariableTable,
        desc: &AnalysisDescription,
        ls: &mut dyn LinearSystemLike,
    ) {
        dispatch!(self, stamp_shared(vars, desc, ls))
    }

    fn stamp_exclusive(
        &self,
        vars: &VariableTable,
        desc: &AnalysisDescription,
        ls: &mut dyn LinearSystemLike,
    ) {
        dispatch!(self, stamp_exclusive(vars, desc, ls))
    }

    fn update_state(&mut self, x: &[f64], vars: &VariableTable) {
        dispatch!(self, update_state(x, vars))
    }

    fn dc_bias_error(&self, x: &[f64], vars: &VariableTable) -> f64 {
        dispatch!(self, dc_bias_error(x, vars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use krets_matrix::{Backing, RealLinearSystem};
    use krets_parser::parser::parse_circuit_description;

    #[test]
    fn resistor_divider_stamps_a_single_conductance_row() {
        let assembled = parse_circuit_description("VSs vcc gnd 5\nR1 vcc vout 1k\nR2 vout gnd 1k\n")
            .unwrap()
            .assemble()
            .unwrap();
        let mut ls = RealLinearSystem::new(assembled.vars.len(), Backing::Sparse);
        let desc = AnalysisDescription::dc();
        for element in &assembled.elements {
            if element.is_disabled() {
                continue;
            }
            element.stamp_shared(&assembled.vars, &desc, &mut ls);
            element.stamp_exclusive(&assembled.vars, &desc, &mut ls);
        }
        ls.solve().unwrap();
        let vout = assembled.vars.index_of("vout").unwrap();
        assert!((ls.x()[vout] - 2.5).abs() < 1e-9);
    }
}
