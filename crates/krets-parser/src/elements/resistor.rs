use crate::prelude::*;
use nom::{
    IResult, Parser, bytes::complete::tag_no_case, character::complete::space1,
    combinator::all_consuming, sequence::preceded,
};
use std::fmt;

#[derive(Debug, Clone)]
/// A linear resistor. Stamped without an auxiliary branch current.
pub struct Resistor {
    pub name: String,
    /// Resistance in Ohms. Mutable via `get_component_for_modification`.
    pub value: f64,
    pub plus: Node,
    pub minus: Node,
}

impl Resistor {
    pub fn identifier(&self) -> String {
        format!("R{}", self.name)
    }
}

impl fmt::Display for Resistor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{} {} {} {}", self.name, self.plus, self.minus, self.value)
    }
}

pub fn parse_resistor(input: &str) -> IResult<&str, Resistor> {
    let (input, _) = tag_no_case("R").parse(input)?;
    let (input, name) = alphanumeric_or_underscore1(input)?;
    let (input, plus) = preceded(space1, alphanumeric_or_underscore1).parse(input)?;
    let (input, minus) = preceded(space1, alphanumeric_or_underscore1).parse(input)?;
    let (input, value) = preceded(space1, value_parser).parse(input)?;

    let resistor = Resistor {
        name: name.to_string(),
        plus: Node::var(plus),
        minus: Node::var(minus),
        value,
    };

    Ok((input, resistor))
}

impl FromStr for Resistor {
    type Err = crate::prelude::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s_without_comment = s.split('%').next().unwrap_or("").trim();
        let (_, resistor) = all_consuming(parse_resistor)
            .parse(s_without_comment)
            .map_err(|e| Error::InvalidFormat(e.to_string()))?;

        if resistor.value <= 0.0 {
            return Err(Error::InvalidFloatValue(format!(
                "Resistor value must be positive: '{s}'"
            )));
        }

        Ok(resistor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resistor() {
        let resistor = "R1 1 0 1000".parse::<Resistor>().unwrap();
        assert_eq!(resistor.name, "1");
        assert_eq!(resistor.plus, Node::var("1"));
        assert_eq!(resistor.minus, Node::var("0"));
        assert_eq!(resistor.value, 1000.0);
    }

    #[test]
    fn test_parse_resistor_with_suffix() {
        let resistor = "R1 vcc v_out 1k".parse::<Resistor>().unwrap();
        assert_eq!(resistor.value, 1000.0);
    }

    #[test]
    fn test_invalid_resistor_format() {
        assert!("R1 1 0".parse::<Resistor>().is_err());
    }

    #[test]
    fn test_error_on_zero_value() {
        assert!("R1 1 0 0".parse::<Resistor>().is_err());
    }

    #[test]
    fn test_invalid_resistor_value() {
        assert!("R1 1 0 abc".parse::<Resistor>().is_err());
    }
}
