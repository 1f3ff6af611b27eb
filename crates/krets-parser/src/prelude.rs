pub use crate::error::Error;
pub type Result<T> = core::result::Result<T, Error>;

pub use crate::elements::{Element, Identifiable};
pub use crate::node::Node;
pub use crate::utils::{
    alphanumeric_or_underscore1, parse_value, strip_unit_suffix, validate_component_name,
    value_parser,
};
pub use std::collections::HashMap;
pub use std::str::FromStr;
