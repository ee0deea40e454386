mod text;

use std::path::Path;

use crate::error::ParseError;
use crate::types::Feature;

pub use text::{parse_feature_text, TextFeatureParser};

/// Turns raw input into a [`Feature`].
pub trait FeatureParser: Send + Sync {
    fn parse(&self, input: &str) -> Result<Feature, ParseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureFormat {
    Text,
    Json,
    Yaml,
    Auto,
}

impl FeatureFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("feature") => FeatureFormat::Text,
            Some("json") => FeatureFormat::Json,
            Some("yaml" | "yml") => FeatureFormat::Yaml,
            _ => FeatureFormat::Auto,
        }
    }
}

impl FeatureParser for FeatureFormat {
    fn parse(&self, input: &str) -> Result<Feature, ParseError> {
        parse_feature_str(input, *self).map(|p| p.feature)
    }
}

#[derive(Debug, Clone)]
pub struct ParsedFeature {
    pub feature: Feature,
    pub format: FeatureFormat,
}

pub fn parse_feature_str(input: &str, format: FeatureFormat) -> Result<ParsedFeature, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    match format {
        FeatureFormat::Text => Ok(ParsedFeature {
            feature: parse_feature_text(input)?,
            format,
        }),
        FeatureFormat::Json => Ok(ParsedFeature {
            feature: serde_json::from_str::<Feature>(input)?,
            format,
        }),
        FeatureFormat::Yaml => Ok(ParsedFeature {
            feature: serde_yaml::from_str::<Feature>(input)?,
            format,
        }),
        FeatureFormat::Auto => parse_feature_auto(input),
    }
}

fn parse_feature_auto(input: &str) -> Result<ParsedFeature, ParseError> {
    let trimmed = input.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return match serde_json::from_str::<Feature>(input) {
            Ok(feature) => Ok(ParsedFeature {
                feature,
                format: FeatureFormat::Json,
            }),
            Err(e) => match serde_yaml::from_str::<Feature>(input) {
                Ok(feature) => Ok(ParsedFeature {
                    feature,
                    format: FeatureFormat::Yaml,
                }),
                Err(_) => Err(ParseError::Json(e)),
            },
        };
    }

    if looks_like_feature_text(input) {
        return Ok(ParsedFeature {
            feature: parse_feature_text(input)?,
            format: FeatureFormat::Text,
        });
    }

    match serde_yaml::from_str::<Feature>(input) {
        Ok(feature) => Ok(ParsedFeature {
            feature,
            format: FeatureFormat::Yaml,
        }),
        Err(e) => {
            if let Ok(feature) = serde_json::from_str::<Feature>(input) {
                return Ok(ParsedFeature {
                    feature,
                    format: FeatureFormat::Json,
                });
            }
            Err(ParseError::Yaml(e))
        }
    }
}

/// The first meaningful line opens with a `Feature:` header.
fn looks_like_feature_text(input: &str) -> bool {
    input
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with('@'))
        .map(|l| l.to_ascii_lowercase().starts_with("feature:"))
        .unwrap_or(false)
}
