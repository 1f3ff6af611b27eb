use crate::prelude::*;

pub mod capacitor;
pub mod diode;
pub mod inductor;
pub mod resistor;
pub mod voltage_generator;
pub mod voltage_source;

/// Any component that can appear in a netlist.
#[derive(Debug, Clone)]
pub enum Element {
    Resistor(resistor::Resistor),
    VoltageSource(voltage_source::VoltageSource),
    VoltageGenerator(voltage_generator::VoltageGenerator),
    Diode(diode::Diode),
    Capacitor(capacitor::Capacitor),
    Inductor(inductor::Inductor),
}

/// Forwards a method call to the active variant, to avoid repeating the
/// match arms for every operation below.
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

impl From<resistor::Resistor> for Element {
    fn from(item: resistor::Resistor) -> Self {
        Element::Resistor(item)
    }
}
impl From<voltage_source::VoltageSource> for Element {
    fn from(item: voltage_source::VoltageSource) -> Self {
        Element::VoltageSource(item)
    }
}
impl From<voltage_generator::VoltageGenerator> for Element {
    fn from(item: voltage_generator::VoltageGenerator) -> Self {
        Element::VoltageGenerator(item)
    }
}
impl From<diode::Diode> for Element {
    fn from(item: diode::Diode) -> Self {
        Element::Diode(item)
    }
}
impl From<capacitor::Capacitor> for Element {
    fn from(item: capacitor::Capacitor) -> Self {
        Element::Capacitor(item)
    }
}
impl From<inductor::Inductor> for Element {
    fn from(item: inductor::Inductor) -> Self {
        Element::Inductor(item)
    }
}

impl Element {
    pub fn name(&self) -> &str {
        match self {
            Element::Resistor(e) => &e.name,
            Element::VoltageSource(e) => &e.name,
            Element::VoltageGenerator(e) => &e.name,
            Element::Diode(e) => &e.name,
            Element::Capacitor(e) => &e.name,
            Element::Inductor(e) => &e.name,
        }
    }

    pub fn set_name(&mut self, name: String) {
        match self {
            Element::Resistor(e) => e.name = name,
            Element::VoltageSource(e) => e.name = name,
            Element::VoltageGenerator(e) => e.name = name,
            Element::Diode(e) => e.name = name,
            Element::Capacitor(e) => e.name = name,
            Element::Inductor(e) => e.name = name,
        }
    }

    pub fn nodes(&self) -> Vec<&Node> {
        match self {
            Element::Resistor(e) => vec![&e.plus, &e.minus],
            Element::VoltageSource(e) => vec![&e.plus, &e.minus],
            Element::VoltageGenerator(e) => vec![&e.plus, &e.minus],
            Element::Diode(e) => vec![&e.plus, &e.minus],
            Element::Capacitor(e) => vec![&e.plus, &e.minus],
            Element::Inductor(e) => vec![&e.plus, &e.minus],
        }
    }

    pub fn is_nonlinear(&self) -> bool {
        matches!(self, Element::Diode(_))
    }

    /// Generates the auxiliary branch-current/internal-node names this
    /// component needs, once per assembly pass.
    pub fn generate_auxiliary_names(&mut self) {
        match self {
            Element::Resistor(_) | Element::Diode(_) | Element::Capacitor(_) => {}
            Element::VoltageSource(e) => e.generate_aux_name(),
            Element::VoltageGenerator(e) => e.generate_aux_name(),
            Element::Inductor(e) => e.generate_aux_name(),
        }
    }

    /// Variable names this component contributes to the variable table,
    /// beyond its own node names.
    pub fn auxiliary_variable_names(&self) -> Vec<String> {
        match self {
            Element::Resistor(_) => vec![],
            Element::VoltageSource(e) => e.current_var.clone().into_iter().collect(),
            Element::VoltageGenerator(e) => e.current_var.clone().into_iter().collect(),
            Element::Diode(e) => vec![
                format!("{}.current", e.name),
                format!("{}.internal_node", e.name),
            ],
            Element::Capacitor(e) => vec![format!("{}.current", e.name)],
            Element::Inductor(e) => e.current_var.clone().into_iter().collect(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Element::VoltageSource(e) if e.disabled)
    }
}

/// A component with a unique netlist identifier (e.g. `R1`, `VS2`).
pub trait Identifiable {
    fn identifier(&self) -> String;
}

impl Identifiable for Element {
    fn identifier(&self) -> String {
        dispatch!(self, identifier())
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identifier())
    }
}
