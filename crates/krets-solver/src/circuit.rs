//! The host-facing, stateful circuit: wraps an `AssembledCircuit`
//! with the linear system(s), transient bookkeeping, and the "modified
//! components" set that `get_component_for_modification` populates.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use faer::c64;
use krets_matrix::{Backing, ComplexLinearSystem, RealLinearSystem};
use krets_parser::assembly::AssembledCircuit;
use krets_parser::prelude::Element;
use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::newton::solve_nonlinear;
use crate::stamp::{AnalysisDescription, restamp_all};
use crate::stampable::Stampable;

/// Per-run state for an in-progress transient simulation, kept across
/// `continue_transient_simulation` calls on the same `Circuit`.
struct TransientState {
    ls: RealLinearSystem,
    desc: AnalysisDescription,
    t: f64,
    start_record_time: f64,
    var_indices: Vec<usize>,
    timestamps: Vec<f64>,
    series: Vec<Vec<f64>>,
}

/// An assembled, analysis-ready circuit. Distinct from
/// [`krets_parser::circuit::Circuit`], the raw parsed element list.
pub struct Circuit {
    assembled: AssembledCircuit,
    modified: HashSet<usize>,
    transient: Option<TransientState>,
    last_solution: Option<Vec<f64>>,
}

/// A mutation surface returned by `get_component_for_modification`; setters
/// that don't match the component's actual variant warn rather than error
///.
pub struct ComponentHandle<'a> {
    element: &'a mut Element,
}

impl ComponentHandle<'_> {
    pub fn set_resistance(&mut self, value: f64) {
        match self.element {
            Element::Resistor(r) => r.value = value,
            other => warn!(
                "set_resistance called on non-resistor component '{}'",
                other.name()
            ),
        }
    }

    pub fn set_voltage(&mut self, value: f64) {
        match self.element {
            Element::VoltageGenerator(vg) => vg.value = value,
            Element::VoltageSource(vs) => vs.value = value,
            other => warn!(
                "set_voltage called on non-source component '{}'",
                other.name()
            ),
        }
    }
}

/// `logspace`/`linspace` over `[f_start, f_end]`.
pub fn frequency_grid(f_start: f64, f_end: f64, n: usize, log_scale: bool) -> Vec<f64> {
    if n <= 1 {
        return vec![f_start];
    }
    let steps = n as f64 - 1.0;
    if log_scale {
        let (l0, l1) = (f_start.log10(), f_end.log10());
        (0..n)
            .map(|i| 10f64.powf(l0 + (l1 - l0) * i as f64 / steps))
            .collect()
    } else {
        (0..n)
            .map(|i| f_start + (f_end - f_start) * i as f64 / steps)
            .collect()
    }
}

impl Circuit {
    /// Parses and assembles a netlist into an analysis-ready circuit.
    pub fn from_netlist(text: &str) -> Result<Self> {
        let parsed = krets_parser::parser::parse_circuit_description(text)?;
        let assembled = parsed.assemble()?;
        Ok(Self {
            assembled,
            modified: HashSet::new(),
            transient: None,
            last_solution: None,
        })
    }

    /// Runs a DC operating-point analysis and returns every variable
    /// by name.
    pub fn dc_analysis(
        &mut self,
        opts: Backing,
        max_iter: usize,
        debug_trace: bool,
    ) -> Result<HashMap<String, f64>> {
        let AssembledCircuit {
            elements,
            vars,
            non_linear,
            ..
        } = &mut self.assembled;

        let desc = AnalysisDescription::dc();
        let mut ls = RealLinearSystem::new(vars.len(), opts);
        restamp_all(elements, vars, &desc, &mut ls)?;
        solve_nonlinear(elements, vars, non_linear, &desc, &mut ls, max_iter)?;

        if debug_trace {
            debug!("{ls}");
        }

        let x = ls.x().to_vec();
        info!("DC analysis converged");
        self.last_solution = Some(x.clone());

        let mut result = HashMap::with_capacity(vars.len());
        for (index, value) in x.into_iter().enumerate() {
            if let Some(name) = vars.name_at(index) {
                result.insert(name.to_string(), value);
            }
        }
        Ok(result)
    }

    /// Starts a fresh transient run from `t = 0`, sampling `var_names` from
    /// `t_start_record` through `run_time` later.
    #[allow(clippy::too_many_arguments)]
    pub fn transient_simulation(
        &mut self,
        t_start_record: f64,
        t_end: f64,
        var_names: &[String],
        time_step: Option<f64>,
        opts: Backing,
        max_iter: usize,
        debug_trace: bool,
    ) -> Result<(Vec<f64>, Vec<Vec<f64>>)> {
        let time_step = time_step.unwrap_or((t_end - t_start_record) / 1024.0);

        let var_indices = var_names
            .iter()
            .map(|name| {
                self.assembled
                    .vars
                    .index_of(name)
                    .ok_or_else(|| Error::UnknownVariable(name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let desc = AnalysisDescription::transient(time_step);
        let mut ls = RealLinearSystem::new(self.assembled.vars.len(), opts);
        restamp_all(&self.assembled.elements, &self.assembled.vars, &desc, &mut ls)?;

        self.transient = Some(TransientState {
            ls,
            desc,
            t: 0.0,
            start_record_time: t_start_record,
            var_indices,
            timestamps: Vec::new(),
            series: vec![Vec::new(); var_names.len()],
        });

        self.continue_transient_simulation(t_end, time_step, max_iter, debug_trace)
    }

    /// Advances an in-progress transient run by `run_time`, stepping with
    /// the three-way end-time clamping predicate.
    pub fn continue_transient_simulation(
        &mut self,
        run_time: f64,
        time_step: f64,
        max_iter: usize,
        debug_trace: bool,
    ) -> Result<(Vec<f64>, Vec<Vec<f64>>)> {
        let modified = std::mem::take(&mut self.modified);
        let AssembledCircuit {
            elements,
            vars,
            non_linear,
            lc,
            ..
        } = &mut self.assembled;
        let transient = self
            .transient
            .as_mut()
            .expect("continue_transient_simulation called before transient_simulation");

        transient.desc.time_step = time_step;
        let end_time = transient.t + run_time;

        if !modified.is_empty() {
            restamp_all(elements, vars, &transient.desc, &mut transient.ls)?;
        }

        while transient.t < end_time {
            solve_nonlinear(
                elements,
                vars,
                non_linear,
                &transient.desc,
                &mut transient.ls,
                max_iter,
            )?;

            if transient.t >= transient.start_record_time {
                transient.timestamps.push(transient.t);
                let x = transient.ls.x();
                for (series, &idx) in transient.series.iter_mut().zip(&transient.var_indices) {
                    series.push(x[idx]);
                }
            }

            let x = transient.ls.x().to_vec();
            for &idx in lc.iter() {
                elements[idx].update_state(&x, vars);
            }
            restamp_all(elements, vars, &transient.desc, &mut transient.ls)?;

            if transient.t + 2.0 * time_step < end_time {
                transient.t += time_step;
            } else if transient.t + time_step >= end_time {
                transient.desc.time_step = end_time - transient.t;
                transient.t = end_time;
            } else {
                let half = (end_time - transient.t) / 2.0;
                transient.desc.time_step = half;
                transient.t += half;
            }
        }

        if debug_trace {
            debug!("{}", transient.ls);
        }
        info!("transient analysis advanced to t={}", transient.t);

        self.last_solution = Some(transient.ls.x().to_vec());
        Ok((transient.timestamps.clone(), transient.series.clone()))
    }

    /// Sweeps AC frequency response over a log- or linearly-spaced
    /// grid, returning the frequencies and the complex response of each
    /// requested variable.
    #[allow(clippy::too_many_arguments)]
    pub fn ac_sweep(
        &mut self,
        var_names: &[String],
        f_start: f64,
        f_end: f64,
        n: usize,
        log_scale: bool,
        opts: Backing,
        max_iter: usize,
        debug_trace: bool,
    ) -> Result<(Vec<f64>, Vec<Vec<c64>>)> {
        let freqs = frequency_grid(f_start, f_end, n, log_scale);

        let AssembledCircuit {
            elements,
            vars,
            non_linear,
            ..
        } = &mut self.assembled;

        let var_indices = var_names
            .iter()
            .map(|name| {
                vars.index_of(name)
                    .ok_or_else(|| Error::UnknownVariable(name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut desc = AnalysisDescription::ac_sweep(2.0 * PI * freqs[0]);
        let mut ls = ComplexLinearSystem::new(vars.len(), opts);
        restamp_all(elements, vars, &desc, &mut ls)?;

        let mut frequencies = Vec::with_capacity(freqs.len());
        let mut series: Vec<Vec<c64>> = vec![Vec::with_capacity(freqs.len()); var_names.len()];

        for &f in &freqs {
            desc.omega = 2.0 * PI * f;
            restamp_all(elements, vars, &desc, &mut ls)?;
            solve_nonlinear(elements, vars, non_linear, &desc, &mut ls, max_iter)?;

            frequencies.push(f);
            let x = ls.x();
            for (series, &idx) in series.iter_mut().zip(&var_indices) {
                series.push(x[idx]);
            }
        }

        if debug_trace {
            debug!("{ls}");
        }
        info!("AC sweep complete: {} points", freqs.len());
        self.last_solution = Some(ls.x().iter().map(|c| c.re).collect());

        Ok((frequencies, series))
    }

    /// Reads a named variable from the most recently completed analysis.
    pub fn get_variable(&self, name: &str) -> Result<f64> {
        let idx = self
            .assembled
            .vars
            .index_of(name)
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))?;
        let solution = self
            .last_solution
            .as_ref()
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))?;
        Ok(solution[idx])
    }

    /// Looks up a component by its user-visible name, marking it for
    /// re-stamping on the next `continue_transient_simulation` call.
    pub fn get_component_for_modification(&mut self, name: &str) -> Option<ComponentHandle<'_>> {
        let idx = *self.assembled.components.get(name)?;
        self.modified.insert(idx);
        Some(ComponentHandle {
            element: &mut self.assembled.elements[idx],
        })
    }

    pub fn clear_transient_simulation_data(&mut self) {
        if let Some(transient) = self.transient.as_mut() {
            transient.timestamps.clear();
            for series in transient.series.iter_mut() {
                series.clear();
            }
        }
    }

    pub fn get_transient_simulation_time(&self) -> f64 {
        self.transient.as_ref().map_or(0.0, |t| t.t)
    }
}
