use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("line {line}: {message}")]
    Text { line: usize, message: String },
    #[error("feature input is empty")]
    Empty,
}

impl ParseError {
    pub fn text(line: usize, message: impl Into<String>) -> Self {
        Self::Text {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum VarsError {
    #[error("scope must be an object")]
    InvalidScope,
    #[error("variable path must not be empty")]
    EmptyPath,
    #[error("cannot descend into '{segment}': not an object or array")]
    NotAContainer { segment: String },
    #[error("array index out of range: {segment}")]
    IndexOutOfRange { segment: String },
    #[error("body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid JSON path '{path}': {message}")]
    JsonPath { path: String, message: String },
    #[error("unclosed template expression (missing '}}}}')")]
    UnclosedExpression,
}
