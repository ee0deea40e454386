use std::fmt;
use std::path::PathBuf;

use qa_core::{ParseError, VarsError};
use serde::Serialize;
use serde_json::Value;

use crate::phrase::{PatternError, StepMatchError};
use crate::scope::Scope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepErrorKind {
    /// No registered phrase matched the step text.
    NoMatch,
    /// The handler reported a failure or panicked.
    Execution,
    /// Any other error surfaced by a handler.
    Foreign,
}

impl StepErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepErrorKind::NoMatch => "no_match",
            StepErrorKind::Execution => "execution",
            StepErrorKind::Foreign => "foreign",
        }
    }
}

/// Why a step failed. The message ends up verbatim on the scenario result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct StepError {
    pub kind: StepErrorKind,
    pub message: String,
    pub scope: Option<Value>,
}

impl StepError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            kind: StepErrorKind::Execution,
            message: message.into(),
            scope: None,
        }
    }

    pub fn no_match(err: &StepMatchError) -> Self {
        Self {
            kind: StepErrorKind::NoMatch,
            message: err.to_string(),
            scope: None,
        }
    }

    pub fn foreign(err: impl fmt::Display) -> Self {
        Self {
            kind: StepErrorKind::Foreign,
            message: err.to_string(),
            scope: None,
        }
    }

    /// Attaches a snapshot of the scope at the point of failure.
    pub fn with_scope(mut self, scope: &Scope) -> Self {
        self.scope = Some(scope.snapshot());
        self
    }

    pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<(), StepError> {
        if condition {
            Ok(())
        } else {
            Err(StepError::failed(message()))
        }
    }
}

impl From<StepMatchError> for StepError {
    fn from(err: StepMatchError) -> Self {
        StepError::no_match(&err)
    }
}

impl From<VarsError> for StepError {
    fn from(err: VarsError) -> Self {
        StepError::foreign(err)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("failed to parse {path}: {source}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid feature glob: {0}")]
    Glob(#[from] glob::PatternError),
    #[error("failed to walk feature directory: {0}")]
    Walk(#[from] glob::GlobError),
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    Vars(#[from] VarsError),
}
