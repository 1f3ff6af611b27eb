use nom::{
    IResult, Parser,
    bytes::complete::{is_not, take_while1},
    combinator::map_res,
};

use crate::prelude::*;

/// Parses a SPICE-style numeric value string with engineering suffixes.
///
/// Suffix matching is case-sensitive, unlike ordinary SPICE tools: `k`/`K`
/// both mean kilo, but `m` (milli) and `M` are distinct, and `M` maps to
/// `1e9` rather than the industry-standard `1e6`. Deliberate, see DESIGN.md.
///
/// # Supported suffixes
/// `T`: 1e12, `G`: 1e9, `M`: 1e9, `k`/`K`: 1e3, `m`: 1e-3, `u`: 1e-6,
/// `n`: 1e-9, `p`: 1e-12.
pub fn parse_value(s: &str) -> Result<f64> {
    let (num_part, multiplier) = match s.chars().last() {
        Some('T') => (&s[..s.len() - 1], 1e12),
        Some('G') => (&s[..s.len() - 1], 1e9),
        Some('M') => (&s[..s.len() - 1], 1e9),
        Some('k') | Some('K') => (&s[..s.len() - 1], 1e3),
        Some('m') => (&s[..s.len() - 1], 1e-3),
        Some('u') => (&s[..s.len() - 1], 1e-6),
        Some('n') => (&s[..s.len() - 1], 1e-9),
        Some('p') => (&s[..s.len() - 1], 1e-12),
        _ => (s, 1.0),
    };

    let base_value: f64 = num_part
        .parse()
        .map_err(|_| Error::InvalidFloatValue(format!("Invalid numeric value '{s}'")))?;

    Ok(base_value * multiplier)
}

/// Parses a string consisting of alphanumeric characters and underscores.
pub fn alphanumeric_or_underscore1(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_').parse(input)
}

/// A nom parser that recognizes a value token and parses it with [`parse_value`].
pub fn value_parser(input: &str) -> IResult<&str, f64> {
    let token_parser = is_not(" \t\r\n()");
    map_res(token_parser, parse_value).parse(input)
}

/// Strips a trailing unit letter (`V`, `Ohm`, `F`, `H`, case-insensitive) that
/// the netlist grammar allows after a numeric value, before suffix parsing.
pub fn strip_unit_suffix<'a>(token: &'a str, units: &[&str]) -> &'a str {
    for unit in units {
        if token.len() > unit.len() && token[token.len() - unit.len()..].eq_ignore_ascii_case(unit)
        {
            return &token[..token.len() - unit.len()];
        }
    }
    token
}

/// Rejects names that violate the naming convention: no `$` prefix,
/// no `.` anywhere.
pub fn validate_component_name(name: &str) -> Result<()> {
    if name.starts_with('$') {
        return Err(Error::InvalidNodeName(format!(
            "name '{name}' may not start with '$'"
        )));
    }
    if name.contains('.') {
        return Err(Error::InvalidNodeName(format!(
            "name '{name}' may not contain '.'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_parser_suffixes() {
        let epsilon = 1e-15;
        assert!((parse_value("1.5k").unwrap() - 1500.0).abs() < epsilon);
        assert!((parse_value("1.5K").unwrap() - 1500.0).abs() < epsilon);
        assert!((parse_value("10u").unwrap() - 10e-6).abs() < epsilon);
        assert!((parse_value("22n").unwrap() - 22e-9).abs() < epsilon);
        assert!((parse_value("1.2p").unwrap() - 1.2e-12).abs() < epsilon);
        assert!((parse_value("100").unwrap() - 100.0).abs() < epsilon);
        assert!((parse_value("1e-6").unwrap() - 1e-6).abs() < epsilon);
        assert!((parse_value("1.23E-9").unwrap() - 1.23e-9).abs() < epsilon);
        assert!(parse_value("1.5x").is_err());
        assert!(parse_value("garbage").is_err());
    }

    #[test]
    fn m_suffix_matches_giga_not_milli() {
        // Uppercase 'M' deliberately means 1e9, not the usual mega (1e6).
        assert_eq!(parse_value("1M").unwrap(), 1e9);
        assert_eq!(parse_value("1m").unwrap(), 1e-3);
    }

    #[test]
    fn rejects_dollar_and_dot_names() {
        assert!(validate_component_name("$0").is_err());
        assert!(validate_component_name("r.1").is_err());
        assert!(validate_component_name("r1").is_ok());
    }
}
