use crate::prelude::*;

use nom::{
    IResult, Parser, bytes::complete::{tag, tag_no_case}, character::complete::space1,
    combinator::all_consuming, sequence::preceded,
};
use std::fmt;

/// A diode, linearized about its bias point for Newton iteration:
/// `i_bias = i0 * exp(m * (v_bias - v0))`. `v_bias` tracks the operating
/// point used by the most recent stamp and is updated with damping after
/// every Newton iteration.
#[derive(Debug, Clone)]
pub struct Diode {
    pub name: String,
    pub plus: Node,
    pub minus: Node,
    pub i0: f64,
    pub m: f64,
    pub v0: f64,
    pub v_bias: f64,
}

impl Diode {
    pub fn identifier(&self) -> String {
        format!("D{}", self.name)
    }
}

impl fmt::Display for Diode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "D{} {} {} i0={} m={} v0={}",
            self.name, self.plus, self.minus, self.i0, self.m, self.v0
        )
    }
}

fn named_value<'a>(name: &'static str, input: &'a str) -> IResult<&'a str, f64> {
    preceded((tag_no_case(name), tag("=")), value_parser).parse(input)
}

fn parse_diode(input: &str) -> IResult<&str, Diode> {
    let (input, _) = tag_no_case("D").parse(input)?;
    let (input, name) = alphanumeric_or_underscore1(input)?;
    let (input, plus) = preceded(space1, alphanumeric_or_underscore1).parse(input)?;
    let (input, minus) = preceded(space1, alphanumeric_or_underscore1).parse(input)?;
    let (input, _) = space1(input)?;
    let (input, i0) = named_value("i0", input)?;
    let (input, _) = space1(input)?;
    let (input, m) = named_value("m", input)?;
    let (input, _) = space1(input)?;
    let (input, v0) = named_value("v0", input)?;

    let diode = Diode {
        name: name.to_string(),
        plus: Node::var(plus),
        minus: Node::var(minus),
        i0,
        m,
        v0,
        v_bias: v0,
    };

    Ok((input, diode))
}

impl FromStr for Diode {
    type Err = crate::prelude::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s_without_comment = s.split(['%', '*']).next().unwrap_or("").trim();

        let (_, diode) = all_consuming(parse_diode)
            .parse(s_without_comment)
            .map_err(|e| Error::InvalidFormat(e.to_string()))?;

        Ok(diode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_diode() {
        let diode = "D1 v1 0 i0=1e-5 m=3 v0=0.5".parse::<Diode>().unwrap();
        assert_eq!(diode.name, "1");
        assert_eq!(diode.plus, Node::var("v1"));
        assert_eq!(diode.minus, Node::var("0"));
        assert_eq!(diode.i0, 1e-5);
        assert_eq!(diode.m, 3.0);
        assert_eq!(diode.v0, 0.5);
        assert_eq!(diode.v_bias, 0.5);
    }

    #[test]
    fn test_parse_diode_lowercase() {
        let diode = "d5 nodeA nodeB i0=1e-12 m=1 v0=0.6"
            .parse::<Diode>()
            .unwrap();
        assert_eq!(diode.name, "5");
    }

    #[test]
    fn test_invalid_diode_missing_param() {
        assert!("D1 1 0 i0=1e-5 m=3".parse::<Diode>().is_err());
    }

    #[test]
    fn test_invalid_prefix() {
        assert!("R1 1 0 i0=1e-5 m=3 v0=0.5".parse::<Diode>().is_err());
    }
}
