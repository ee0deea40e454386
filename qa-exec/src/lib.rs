#![forbid(unsafe_code)]

//! Phrase dispatch and the feature execution engine.
//!
//! Feature parsing and the variable store live in `qa-core`.

pub mod dialect;
pub mod engine;
pub mod handler;
pub mod phrase;
pub mod scope;

pub use crate::dialect::{CommonDialect, Dialect, ScriptEngine, ScriptingDialect, VariablesDialect};
pub use crate::engine::{
    Engine, EngineConfig, EngineError, Event, EventSink, FeatureResult, ResultSet, ScenarioResult,
    Status, StepError, StepErrorKind,
};
pub use crate::handler::{arity, step_fn, StepHandler};
pub use crate::phrase::{DialectDocs, PatternError, PatternKind, PhraseLibrary, StepMatchError};
pub use crate::scope::Scope;
