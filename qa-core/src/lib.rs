#![forbid(unsafe_code)]

pub mod error;
pub mod parser;
pub mod types;
pub mod vars;

pub use crate::error::{ParseError, VarsError};
pub use crate::parser::{
    parse_feature_str, FeatureFormat, FeatureParser, ParsedFeature, TextFeatureParser,
};
pub use crate::types::{Feature, Scenario, Step};
