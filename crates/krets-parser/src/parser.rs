use crate::circuit::Circuit;
use crate::elements::{
    capacitor::Capacitor, diode::Diode, inductor::Inductor, resistor::Resistor,
    voltage_generator::VoltageGenerator, voltage_source::VoltageSource,
};
use crate::prelude::*;

/// Parses a netlist: free-form whitespace-separated tokens, one
/// component or constant-reference per line, `#`/`//`/`;`/`*` comments,
/// case-insensitive element letters.
pub fn parse_circuit_description(input: &str) -> Result<Circuit> {
    let mut circuit = Circuit::empty();

    for (line_num, raw_line) in input.lines().enumerate() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let parsed = parse_line(line).map_err(|e| Error::ParseError {
            line: line_num + 1,
            message: e.to_string(),
        })?;

        match parsed {
            Line::Element(element) => circuit.elements.push(element),
            Line::Constant(name, value) => {
                circuit.voltage_constants.insert(name, value);
            }
        }
    }

    if circuit.is_empty() {
        return Err(Error::EmptyNetlist);
    }

    Ok(circuit)
}

enum Line {
    Element(Element),
    Constant(String, f64),
}

fn strip_comment(line: &str) -> &str {
    let cut = ["#", "//", ";", "*"]
        .iter()
        .filter_map(|marker| line.find(marker))
        .min();
    match cut {
        Some(index) => &line[..index],
        None => line,
    }
}

fn parse_line(line: &str) -> Result<Line> {
    let upper = line.to_ascii_uppercase();

    if upper.starts_with("VS") {
        return Ok(Line::Element(Element::VoltageSource(
            line.parse::<VoltageSource>()?,
        )));
    }
    if upper.starts_with("VG") {
        return Ok(Line::Element(Element::VoltageGenerator(
            line.parse::<VoltageGenerator>()?,
        )));
    }
    if let Some(first) = upper.chars().next() {
        match first {
            'R' => return Ok(Line::Element(Element::Resistor(line.parse::<Resistor>()?))),
            'D' => return Ok(Line::Element(Element::Diode(line.parse::<Diode>()?))),
            'C' => return Ok(Line::Element(Element::Capacitor(line.parse::<Capacitor>()?))),
            'L' => return Ok(Line::Element(Element::Inductor(line.parse::<Inductor>()?))),
            _ => {}
        }
    }

    parse_constant_reference(line)
        .map(|(name, value)| Line::Constant(name, value))
        .ok_or_else(|| Error::InvalidElementFormat(line.to_string()))
}

/// Parses a bare `<name> = value[V|v]` constant-reference line.
fn parse_constant_reference(line: &str) -> Option<(String, f64)> {
    let (name, value) = line.split_once('=')?;
    let name = name.trim();
    validate_component_name(name).ok()?;
    let value_token = strip_unit_suffix(value.trim(), &["V"]);
    let value = parse_value(value_token).ok()?;
    Some((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resistor_divider() {
        let netlist = "VS1 vcc gnd 5\nR1 vcc vout 1k\nR2 vout gnd 1k\n";
        let circuit = parse_circuit_description(netlist).unwrap();
        assert_eq!(circuit.elements.len(), 3);
    }

    #[test]
    fn parses_constant_reference_with_volt_suffix() {
        let netlist = "R1 vcc gnd 1k\nvcc = 5V\n";
        let circuit = parse_circuit_description(netlist).unwrap();
        assert_eq!(circuit.voltage_constants["vcc"], 5.0);
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let netlist = "* a comment\n\n# another\nR1 a gnd 1k ; trailing\n";
        let circuit = parse_circuit_description(netlist).unwrap();
        assert_eq!(circuit.elements.len(), 1);
    }

    #[test]
    fn is_case_insensitive_on_element_letters() {
        let netlist = "r1 a gnd 1k\n";
        let circuit = parse_circuit_description(netlist).unwrap();
        assert_eq!(circuit.elements.len(), 1);
    }

    #[test]
    fn distinguishes_vs_from_vg() {
        let netlist = "VS1 a gnd 5\nVG1 b gnd 3\n";
        let circuit = parse_circuit_description(netlist).unwrap();
        assert!(matches!(circuit.elements[0], Element::VoltageSource(_)));
        assert!(matches!(circuit.elements[1], Element::VoltageGenerator(_)));
    }

    #[test]
    fn empty_netlist_is_an_error() {
        assert!(parse_circuit_description("* only a comment\n").is_err());
    }
}
