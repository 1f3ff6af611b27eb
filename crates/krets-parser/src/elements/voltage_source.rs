use crate::prelude::*;
use nom::{
    IResult, Parser, bytes::complete::tag_no_case, character::complete::space1,
    combinator::all_consuming, sequence::preceded,
};
use std::fmt;

/// An independent voltage source. Once one terminal is anchored to a fixed
/// voltage, constant propagation resolves the other terminal and
/// `disabled` is set so the source drops out of the live system entirely.
#[derive(Debug, Clone)]
pub struct VoltageSource {
    pub name: String,
    pub plus: Node,
    pub minus: Node,
    pub value: f64,
    pub current_var: Option<String>,
    pub disabled: bool,
}

impl VoltageSource {
    pub fn identifier(&self) -> String {
        format!("VS{}", self.name)
    }

    pub fn generate_aux_name(&mut self) {
        self.current_var = Some(format!("{}.current", self.name));
    }

    pub fn variable_names(&self) -> Vec<String> {
        if self.disabled {
            return Vec::new();
        }
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

    /// Mirrors the original `VS.resolve_constants`: once either terminal is
    /// anchored, the other terminal becomes anchored too and the source is
    /// disabled. Returns whether the constants map changed.
    pub fn resolve_constants(&mut self, constants: &mut HashMap<String, f64>) -> Result<bool> {
        if let (Node::Const(n1), Node::Const(n2)) = (&self.plus, &self.minus) {
            if (n1 - n2 - self.value).abs() > 1e-6 {
                return Err(Error::InconsistentConstants {
                    name: self.name.clone(),
                    actual: n1 - n2,
                    expected: self.value,
                });
            }
            return Ok(false);
        }

        if let Node::Var(name) = self.plus.clone() {
            if let Some(&v1) = constants.get(&name) {
                let minus_name = self.minus.name().map(str::to_string);
                self.plus = Node::Const(v1);
                let v2 = v1 - self.value;
                self.minus = Node::Const(v2);
                if let Some(minus_name) = minus_name {
                    constants.insert(minus_name, v2);
                }
                self.disabled = true;
                return Ok(true);
            }
        }

        if let Node::Var(name) = self.minus.clone() {
            if let Some(&v2) = constants.get(&name) {
                let plus_name = self.plus.name().map(str::to_string);
                self.minus = Node::Const(v2);
                let v1 = v2 + self.value;
                self.plus = Node::Const(v1);
                if let Some(plus_name) = plus_name {
                    constants.insert(plus_name, v1);
                }
                self.disabled = true;
                return Ok(true);
            }
        }

        Ok(false)
    }
}

impl fmt::Display for VoltageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VS{} {} {} {}", self.name, self.plus, self.minus, self.value)
    }
}

pub fn parse_voltage_source(input: &str) -> IResult<&str, VoltageSource> {
    let (input, _) = tag_no_case("VS").parse(input)?;
    let (input, name) = alphanumeric_or_underscore1(input)?;
    let (input, plus) = preceded(space1, alphanumeric_or_underscore1).parse(input)?;
    let (input, minus) = preceded(space1, alphanumeric_or_underscore1).parse(input)?;
    let (input, value) = preceded(space1, value_parser).parse(input)?;

    let source = VoltageSource {
        name: name.to_string(),
        plus: Node::var(plus),
        minus: Node::var(minus),
        value,
        current_var: None,
        disabled: false,
    };

    Ok((input, source))
}

impl FromStr for VoltageSource {
    type Err = crate::prelude::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s_without_comment = s.split('%').next().unwrap_or("").trim();
        let (_, source) = all_consuming(parse_voltage_source)
            .parse(s_without_comment)
            .map_err(|e| Error::InvalidFormat(e.to_string()))?;
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_voltage_source() {
        let vs = "VS1 vcc gnd 5".parse::<VoltageSource>().unwrap();
        assert_eq!(vs.name, "1");
        assert_eq!(vs.plus, Node::var("vcc"));
        assert_eq!(vs.minus, Node::var("gnd"));
        assert_eq!(vs.value, 5.0);
        assert!(!vs.disabled);
    }

    #[test]
    fn resolve_constants_propagates_through_one_anchored_terminal() {
        let mut vs = VoltageSource {
            name: "1".to_string(),
            plus: Node::var("vcc"),
            minus: Node::var("gnd"),
            value: 5.0,
            current_var: Some("1.current".to_string()),
            disabled: false,
        };
        let mut constants = HashMap::new();
        constants.insert("gnd".to_string(), 0.0);

        let changed = vs.resolve_constants(&mut constants).unwrap();
        assert!(changed);
        assert!(vs.disabled);
        assert_eq!(vs.plus, Node::Const(5.0));
        assert_eq!(constants["vcc"], 5.0);
        assert!(vs.variable_names().is_empty());
    }

    #[test]
    fn resolve_constants_rejects_inconsistent_fixed_endpoints() {
        let mut vs = VoltageSource {
            name: "1".to_string(),
            plus: Node::Const(5.0),
            minus: Node::Const(0.0),
            value: 3.0,
            current_var: Some("1.current".to_string()),
            disabled: false,
        };
        assert!(vs.resolve_constants(&mut HashMap::new()).is_err());
    }
}
