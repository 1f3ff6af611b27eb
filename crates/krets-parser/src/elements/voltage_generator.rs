use crate::prelude::*;
use nom::{
    IResult, Parser, bytes::complete::tag_no_case, character::complete::space1,
    combinator::all_consuming, sequence::preceded,
};
use std::fmt;

/// An independent voltage source that is never eliminated by constant
/// propagation, unlike [`super::voltage_source::VoltageSource`]. A terminal
/// can become a fixed reference without disabling the branch current
/// variable, so the host can still probe current through it, and its value
/// remains mutable via `get_component_for_modification`.
#[derive(Debug, Clone)]
pub struct VoltageGenerator {
    pub name: String,
    pub plus: Node,
    pub minus: Node,
    pub value: f64,
    pub current_var: Option<String>,
}

impl VoltageGenerator {
    pub fn identifier(&self) -> String {
        format!("VG{}", self.name)
    }

    pub fn generate_aux_name(&mut self) {
        self.current_var = Some(format!("{}.current", self.name));
    }

    pub fn variable_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(name) = self.plus.name() {
            names.push(name.to_string());
        }
        if let Some(name) = self.minus.name() {
            names.push(name.to_string());
        }
        if let Some(current_var) = &self.current_var {
            names.push(current_var.clone());
        }
        names
    }

    /// Resolves each terminal independently against the constants map.
    /// Neither terminal cascades into the constants map and the generator
    /// is never disabled. Returns whether either terminal changed.
    pub fn resolve_constants(&mut self, constants: &HashMap<String, f64>) -> bool {
        let plus_changed = self.plus.resolve(constants);
        let minus_changed = self.minus.resolve(constants);
        plus_changed || minus_changed
    }
}

impl fmt::Display for VoltageGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VG{} {} {} {}", self.name, self.plus, self.minus, self.value)
    }
}

pub fn parse_voltage_generator(input: &str) -> IResult<&str, VoltageGenerator> {
    let (input, _) = tag_no_case("VG").parse(input)?;
    let (input, name) = alphanumeric_or_underscore1(input)?;
    let (input, plus) = preceded(space1, alphanumeric_or_underscore1).parse(input)?;
    let (input, minus) = preceded(space1, alphanumeric_or_underscore1).parse(input)?;
    let (input, value) = preceded(space1, value_parser).parse(input)?;

    let generator = VoltageGenerator {
        name: name.to_string(),
        plus: Node::var(plus),
        minus: Node::var(minus),
        value,
        current_var: None,
    };

    Ok((input, generator))
}

impl FromStr for VoltageGenerator {
    type Err = crate::prelude::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s_without_comment = s.split('%').next().unwrap_or("").trim();
        let (_, generator) = all_consuming(parse_voltage_generator)
            .parse(s_without_comment)
            .map_err(|e| Error::InvalidFormat(e.to_string()))?;
        Ok(generator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_voltage_generator() {
        let vg = "VG1 out gnd 5".parse::<VoltageGenerator>().unwrap();
        assert_eq!(vg.name, "1");
        assert_eq!(vg.plus, Node::var("out"));
        assert_eq!(vg.minus, Node::var("gnd"));
        assert_eq!(vg.value, 5.0);
    }

    #[test]
    fn resolve_constants_fixes_terminals_without_disabling() {
        let mut vg = VoltageGenerator {
            name: "1".to_string(),
            plus: Node::var("out"),
            minus: Node::var("gnd"),
            value: 5.0,
            current_var: Some("1.current".to_string()),
        };
        let mut constants = HashMap::new();
        constants.insert("gnd".to_string(), 0.0);

        let changed = vg.resolve_constants(&constants);
        assert!(changed);
        assert_eq!(vg.minus, Node::Const(0.0));
        assert_eq!(vg.plus, Node::var("out"));
        assert_eq!(vg.variable_names(), vec!["out", "1.current"]);
    }
}
