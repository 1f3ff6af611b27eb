use crate::prelude::*;
use nom::{
    IResult, Parser,
    bytes::complete::{tag, tag_no_case},
    character::complete::space1,
    combinator::{all_consuming, opt},
    sequence::preceded,
};
use std::fmt;

/// A capacitor. Stamped directly on DC and AC; on transient analysis it is
/// replaced by its trapezoidal companion model.
#[derive(Debug, Clone)]
pub struct Capacitor {
    pub name: String,
    /// Capacitance in Farads.
    pub value: f64,
    pub plus: Node,
    pub minus: Node,
    /// Last known terminal voltage, seeded from `v0=` and updated by
    /// `update_state` after each accepted transient step.
    pub v_cap: f64,
    /// Last known branch current, seeded from `i0=` and updated likewise.
    pub i_cap: f64,
}

impl Capacitor {
    pub fn identifier(&self) -> String {
        format!("C{}", self.name)
    }
}

impl fmt::Display for Capacitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{} {} {} {}", self.name, self.plus, self.minus, self.value)
    }
}

pub fn parse_capacitor(input: &str) -> IResult<&str, Capacitor> {
    let (input, _) = tag_no_case("C").parse(input)?;
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

    let capacitor = Capacitor {
        name: name.to_string(),
        plus: Node::var(plus),
        minus: Node::var(minus),
        value,
        v_cap: v0.unwrap_or(0.0),
        i_cap: i0.unwrap_or(0.0),
    };

    Ok((input, capacitor))
}

impl FromStr for Capacitor {
    type Err = crate::prelude::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s_without_comment = s.split('%').next().unwrap_or("").trim();

        let (_, capacitor) = all_consuming(parse_capacitor)
            .parse(s_without_comment)
            .map_err(|e| Error::InvalidFormat(e.to_string()))?;

        Ok(capacitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_capacitor() {
        let capacitor_str = "C1 1 0 0.000001";
        let capacitor = capacitor_str.parse::<Capacitor>().unwrap();

        assert_eq!(capacitor.name, "1");
        assert_eq!(capacitor.plus, Node::var("1"));
        assert_eq!(capacitor.minus, Node::var("0"));
        assert_eq!(capacitor.value, 0.000001);
        assert_eq!(capacitor.v_cap, 0.0);
        assert_eq!(capacitor.i_cap, 0.0);
    }

    #[test]
    fn test_parse_capacitor_with_initial_conditions() {
        let capacitor_str = "C1 1 0 0.000001 v0=2.5 i0=0.1";
        let capacitor = capacitor_str.parse::<Capacitor>().unwrap();
        assert_eq!(capacitor.v_cap, 2.5);
        assert_eq!(capacitor.i_cap, 0.1);
    }

    #[test]
    fn test_parse_capacitor_with_comment() {
        let capacitor_str = "C1 1 0 0.000001 % This is a comment";
        let capacitor = capacitor_str.parse::<Capacitor>().unwrap();
        assert_eq!(capacitor.value, 0.000001);
    }

    #[test]
    fn test_parse_capacitor_with_comment_no_space() {
        let capacitor_str = "C1 1 0 1e-6%This is a comment";
        let capacitor = capacitor_str.parse::<Capacitor>().unwrap();
        assert_eq!(capacitor.value, 1e-6);
    }

    #[test]
    fn test_parse_lowercase() {
        let capacitor_str = "c1 1 0 1e-6";
        let capacitor = capacitor_str.parse::<Capacitor>().unwrap();
        assert_eq!(capacitor.name, "1");
    }

    #[test]
    fn test_invalid_capacitor_format() {
        let capacitor_str = "C1 1 0";
        assert!(capacitor_str.parse::<Capacitor>().is_err());
    }

    #[test]
    fn test_invalid_capacitor_name() {
        let capacitor_str = "C 1 0 0.000001";
        assert!(capacitor_str.parse::<Capacitor>().is_err());
    }

    #[test]
    fn test_invalid_identifier_prefix() {
        let capacitor_str = "R1 1 0 100";
        assert!(capacitor_str.parse::<Capacitor>().is_err());
    }

    #[test]
    fn test_invalid_capacitor_value() {
        let capacitor_str = "C1 1 0 abc";
        assert!(capacitor_str.parse::<Capacitor>().is_err());
    }
}
