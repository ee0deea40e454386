use serde_json::Value;

use super::{find_named, to_text};
use crate::error::VarsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Expr(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub segments: Vec<Segment>,
}

impl Template {
    pub fn has_expressions(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Expr(_)))
    }
}

/// Splits `input` into literal text and `{{ name }}` references.
pub fn parse_template(input: &str) -> Result<Template, VarsError> {
    let mut segments = Vec::new();
    let mut buf = String::new();
    let mut rest = input;

    while let Some(open) = rest.find("{{") {
        buf.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let close = after.find("}}").ok_or(VarsError::UnclosedExpression)?;
        let inner = after[..close].trim();

        if inner.is_empty() {
            // `{{}}` stays literal
            buf.push_str(&rest[open..open + 2 + close + 2]);
        } else {
            if !buf.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut buf)));
            }
            segments.push(Segment::Expr(inner.to_string()));
        }
        rest = &after[close + 2..];
    }
    buf.push_str(rest);

    if !buf.is_empty() {
        segments.push(Segment::Literal(buf));
    }
    Ok(Template { segments })
}

/// Substitutes every `{{ name }}` with the named value from `scope`.
///
/// Missing names render as the empty string.
pub fn render(input: &str, scope: &Value) -> Result<String, VarsError> {
    let template = parse_template(input)?;
    let mut out = String::with_capacity(input.len());
    for segment in &template.segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Expr(name) => {
                if let Some(value) = find_named(scope, name)? {
                    out.push_str(&to_text(&value));
                }
            }
        }
    }
    Ok(out)
}
