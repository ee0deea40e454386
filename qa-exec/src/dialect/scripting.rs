use std::sync::Arc;

use serde_json::{Map, Value};

use super::Dialect;
use crate::engine::StepError;
use crate::handler::{arity, step_fn};
use crate::phrase::{DialectDocs, PatternError, PhraseLibrary};

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("script evaluation failed: {0}")]
    Eval(String),
    #[error("script bindings must be an object")]
    InvalidBindings,
}

/// Evaluates a code fragment against a JSON object of bindings.
pub trait ScriptEngine: Send + Sync {
    fn evaluate(&self, code: &str, bindings: &Value) -> Result<Value, ScriptError>;
}

/// JavaScript-like truthiness.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Phrases that hand their argument to a [`ScriptEngine`].
pub struct ScriptingDialect {
    engine: Arc<dyn ScriptEngine>,
}

impl ScriptingDialect {
    pub fn new(engine: Arc<dyn ScriptEngine>) -> Self {
        Self { engine }
    }
}

impl Dialect for ScriptingDialect {
    fn name(&self) -> &str {
        "scripting"
    }

    fn install(&self, library: &mut PhraseLibrary) -> Result<(), PatternError> {
        let engine = Arc::clone(&self.engine);
        library.register(
            ["I return $code as $varname"],
            step_fn(move |scope, args| {
                let [code, name] = arity::<2>(args)?;
                let result = engine.evaluate(code, scope.as_value()).map_err(StepError::foreign)?;
                scope.set(name, result)?;
                Ok(())
            }),
            Some(DialectDocs::new("scripting.return", "Save the result of an expression")),
        )?;

        let engine = Arc::clone(&self.engine);
        library.register(
            ["I execute\n$code", "I execute $code"],
            step_fn(move |scope, args| {
                let [code] = arity::<1>(args)?;
                let result = engine.evaluate(code, scope.as_value()).map_err(StepError::foreign)?;
                StepError::ensure(result.is_null() || truthy(&result), || {
                    format!("Script returned falsy: {result}")
                })
            }),
            Some(DialectDocs::new("scripting.execute", "Evaluate an expression")),
        )?;

        let engine = Arc::clone(&self.engine);
        library.register(
            ["I assert $code", "I expect $code"],
            step_fn(move |scope, args| {
                let [code] = arity::<1>(args)?;
                let result = engine.evaluate(code, scope.as_value()).map_err(StepError::foreign)?;
                StepError::ensure(truthy(&result), || {
                    format!("Script assert: {code} --> {result}")
                })
            }),
            Some(DialectDocs::new("scripting.assert", "Fail unless an expression is truthy")),
        )?;

        let engine = Arc::clone(&self.engine);
        library.register(
            [
                "I transform $varname as $newvar with:\n$code",
                "I map $varname as $newvar with:\n$code",
            ],
            step_fn(move |scope, args| {
                let [source, target, code] = arity::<3>(args)?;
                let items = match scope.find_named(source)? {
                    Some(Value::Array(items)) => items,
                    Some(Value::Null) | None => Vec::new(),
                    Some(other) => vec![other],
                };

                let mut mapped = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let bindings = item_bindings(scope.as_value(), item, index);
                    mapped.push(engine.evaluate(code, &bindings).map_err(StepError::foreign)?);
                }
                scope.set(target, Value::Array(mapped))?;
                Ok(())
            }),
            Some(DialectDocs::new("scripting.transform", "Map every element of a list")),
        )?;
        Ok(())
    }
}

fn item_bindings(scope: &Value, item: Value, index: usize) -> Value {
    let mut bindings = scope.as_object().cloned().unwrap_or_else(Map::new);
    bindings.insert("item".to_string(), item);
    bindings.insert("index".to_string(), Value::from(index));
    Value::Object(bindings)
}

/// [`ScriptEngine`] backed by JEXL expressions.
#[cfg(feature = "jexl")]
#[derive(Debug, Default, Clone, Copy)]
pub struct JexlScriptEngine;

#[cfg(feature = "jexl")]
impl ScriptEngine for JexlScriptEngine {
    fn evaluate(&self, code: &str, bindings: &Value) -> Result<Value, ScriptError> {
        if !bindings.is_object() {
            return Err(ScriptError::InvalidBindings);
        }
        jexl_eval::Evaluator::new()
            .eval_in_context(code.trim(), bindings)
            .map_err(|e| ScriptError::Eval(e.to_string()))
    }
}
