use crate::prelude::*;
use nom::{
    IResult, Parser,
    bytes::complete::{tag, tag_no_case},
    character::complete::space1,
    combinator::{all_consuming, opt},
    sequence::preceded,
};
use std::fmt;

/// An inductor. Stamped as a branch current equation on DC and AC; on
/// transient analysis it is replaced by its trapezoidal companion model.
#[derive(Debug, Clone)]
pub struct Inductor {
    pub name: String,
    /// Inductance in Henries.
    pub value: f64,
    pub plus: Node,
    pub minus: Node,
    pub current_var: Option<String>,
    /// Last known terminal voltage, seeded from `v0=` and updated by
    /// `update_state` after each accepted transient step.
    pub v_l: f64,
    /// Last known branch current, seeded from `i0=` and updated likewise.
    pub i_l: f64,
}

impl Inductor {
    pub fn identifier(&self) -> String {
        format!("L{}", self.name)
    }

    pub fn generate_aux_name(&mut self) {
        self.current_var = Some(format!("{}.current", self.name));
    }
}

impl fmt::Display for Inductor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{} {} {} {}", self.name, self.plus, self.minus, self.value)
    }
}

pub fn parse_inductor(input: &str) -> IResult<&str, Inductor> {
    let (input, _) = tag_no_case("L").parse(input)?;
    let (input, name) = alphanumeric_or_underscore1(input)?;
    let (input, plus) = preceded(space1, alphanumeric_or_underscore1).parse(input)?;
    let (input, minus) = preceded(space1, alphanumeric_or_underscore1).parse(input)?;
    let (input, value) = preceded(space1, value_parser).parse(input)?;
    let (input, v0) = opt(preceded(
        space1,
        preceded((tag_no_case("v0"), tag("=")), value_parser),
    ))
    .parse(input)?;
    let (input, i0) = opt(preceded(
        space1,
        preceded((tag_no_case("i0"), tag("=")), value_parser),
    ))
    .parse(input)?;

    let inductor = Inductor {
        name: name.to_string(),
        plus: Node::var(plus),
        minus: Node::var(minus),
        value,
        current_var: None,
        v_l: v0.unwrap_or(0.0),
        i_l: i0.unwrap_or(0.0),
    };

    Ok((input, inductor))
}

impl FromStr for Inductor {
    type Err = crate::prelude::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s_without_comment = s.split('%').next().unwrap_or("").trim();
        let (_, inductor) = all_consuming(parse_inductor)
            .parse(s_without_comment)
            .map_err(|e| Error::InvalidFormat(e.to_string()))?;

        Ok(inductor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inductor() {
        let inductor_str = "L1 1 0 0.001";
        let inductor = inductor_str.parse::<Inductor>().unwrap();

        assert_eq!(inductor.name, "1");
        assert_eq!(inductor.plus, Node::var("1"));
        assert_eq!(inductor.minus, Node::var("0"));
        assert_eq!(inductor.value, 0.001);
        assert_eq!(inductor.v_l, 0.0);
        assert_eq!(inductor.i_l, 0.0);
    }

    #[test]
    fn test_parse_inductor_with_initial_conditions() {
        let inductor_str = "L1 1 0 0.001 v0=0.5 i0=0.2";
        let inductor = inductor_str.parse::<Inductor>().unwrap();
        assert_eq!(inductor.v_l, 0.5);
        assert_eq!(inductor.i_l, 0.2);
    }

    #[test]
    fn test_parse_inductor_with_comment() {
        let inductor_str = "L1 1 0 0.001 % This is a comment";
        let inductor = inductor_str.parse::<Inductor>().unwrap();
        assert_eq!(inductor.value, 0.001);
    }

    #[test]
    fn test_parse_lowercase_and_scientific() {
        let s = "l2 vcc out 1e-6";
        let inductor = s.parse::<Inductor>().unwrap();
        assert_eq!(inductor.name, "2");
        assert_eq!(inductor.value, 1e-6);
    }

    #[test]
    fn test_invalid_inductor_format() {
        let inductor_str = "L1 1 0";
        assert!(inductor_str.parse::<Inductor>().is_err());
    }

    #[test]
    fn test_invalid_inductor_name() {
        let inductor_str = "L 1 0 0.001";
        assert!(inductor_str.parse::<Inductor>().is_err());
    }

    #[test]
    fn test_invalid_prefix() {
        let s = "R1 1 0 100";
        assert!(s.parse::<Inductor>().is_err());
    }

    #[test]
    fn test_invalid_inductor_value() {
        let inductor_str = "L1 1 0 abc";
        assert!(inductor_str.parse::<Inductor>().is_err());
    }
}
