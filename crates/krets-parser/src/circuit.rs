use crate::prelude::*;

/// The flat, unindexed result of parsing netlist text: a declaration order
/// of components plus any fixed-voltage references declared with
/// `<name> = value` lines. `Circuit::assemble` (via `crate::assembly`) turns
/// this into an `AssembledCircuit` ready for analysis.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    pub elements: Vec<Element>,
    pub voltage_constants: HashMap<String, f64>,
}

impl Circuit {
    pub fn empty() -> Self {
        Circuit::default()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Assembles this circuit, merging `gnd -> 0.0` and the netlist's own
    /// `<name> = value` bindings into the constants map.
    pub fn assemble(self) -> Result<crate::assembly::AssembledCircuit> {
        let mut constants = self.voltage_constants;
        constants.entry("gnd".to_string()).or_insert(0.0);
        crate::assembly::assemble(self.elements, constants)
    }
}
