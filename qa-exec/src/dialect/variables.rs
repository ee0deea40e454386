use qa_core::vars::{self, find_all_in_path, find_in_path, loosely_equals, to_text};
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::info;

use super::Dialect;
use crate::engine::StepError;
use crate::handler::{arity, step_fn};
use crate::phrase::{DialectDocs, PatternError, PhraseLibrary};
use crate::scope::Scope;

/// Setting, converting and asserting on scope variables.
#[derive(Debug, Default, Clone, Copy)]
pub struct VariablesDialect;

impl Dialect for VariablesDialect {
    fn name(&self) -> &str {
        "variables"
    }

    fn defaults(&self) -> Map<String, Value> {
        let mut defaults = Map::new();
        defaults.insert("vars".to_string(), json!({}));
        defaults
    }

    fn install(&self, library: &mut PhraseLibrary) -> Result<(), PatternError> {
        install_setters(library)?;
        install_assertions(library)
    }
}

fn docs(tag: &str, description: &str) -> Option<DialectDocs> {
    Some(DialectDocs::new(tag, description))
}

fn install_setters(library: &mut PhraseLibrary) -> Result<(), PatternError> {
    library.register(
        ["I clear variables", "I reset variables"],
        step_fn(|scope, _| {
            scope.clear();
            Ok(())
        }),
        docs("vars.clear", "Remove every scoped variable"),
    )?;

    library.register(
        ["I set $varname to CSV:\n$CSV", "some CSV as $varname:\n$CSV"],
        step_fn(|scope, args| {
            let [name, csv] = arity::<2>(args)?;
            scope.set(name, csv.as_str())?;
            Ok(())
        }),
        docs("vars.set.block", "Set a variable from an inline block"),
    )?;

    library.register(
        ["I set $varname to JSON:\n$JSON", "some JSON as $varname:\n$JSON"],
        step_fn(|scope, args| {
            let [name, body] = arity::<2>(args)?;
            let value: Value = serde_json::from_str(body)
                .map_err(|e| StepError::failed(format!("invalid JSON for {name}: {e}")))?;
            scope.set(name, value)?;
            Ok(())
        }),
        docs("vars.set.block", "Set a variable from an inline block"),
    )?;

    library.register(
        ["I set $varname to text:\n$TEXT", "some text as $varname:\n$TEXT"],
        step_fn(|scope, args| {
            let [name, text] = arity::<2>(args)?;
            scope.set(name, text.as_str())?;
            Ok(())
        }),
        docs("vars.set.block", "Set a variable from an inline block"),
    )?;

    library.register(
        [
            "I set $varname to $value",
            "I set $varname = $value",
            "I set $varname is $value",
            "I define $varname = $value",
            "I define $varname is $value",
        ],
        step_fn(|scope, args| {
            let [name, value] = arity::<2>(args)?;
            scope.set(name, literal(value))?;
            Ok(())
        }),
        docs("vars.set", "Set a scoped variable to a simple value"),
    )?;

    library.register(
        ["I set $varname from $varname2"],
        step_fn(|scope, args| {
            let [name, source] = arity::<2>(args)?;
            let value = scope
                .find_named(source)?
                .ok_or_else(|| StepError::failed(format!("Value {source} is undefined")))?;
            scope.set(name, value)?;
            Ok(())
        }),
        docs("vars.set", "Set a scoped variable to a simple value"),
    )?;

    library.register(
        ["I unset $varname"],
        step_fn(|scope, args| {
            let [name] = arity::<1>(args)?;
            scope.remove(name);
            Ok(())
        }),
        None,
    )?;

    library.register(
        ["I convert $varname to text"],
        step_fn(|scope, args| {
            let [name] = arity::<1>(args)?;
            let original = scope.find_named(name)?.unwrap_or(Value::Null);
            let text = serde_json::to_string(&original).map_err(StepError::foreign)?;
            scope.set(name, text)?;
            Ok(())
        }),
        None,
    )?;

    library.register(
        ["I sanitize $varname"],
        step_fn(|scope, args| {
            let [name] = arity::<1>(args)?;
            let value = scope
                .get(name)
                .filter(|v| !v.is_null())
                .map(to_text)
                .ok_or_else(|| StepError::failed(format!("Can't sanitize missing value: {name}")))?;
            scope.set(name, vars::sanitize(&value, "_").to_lowercase())?;
            Ok(())
        }),
        None,
    )?;

    library.register(
        ["I merge $varnames as $newvar", "I merge $varnames into $newvar"],
        step_fn(|scope, args| {
            let [names, target] = arity::<2>(args)?;
            let mut merged = Map::new();
            for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                if let Some(Value::Object(found)) = scope.find_named(name)? {
                    merged.extend(found);
                }
            }
            scope.set(target, Value::Object(merged))?;
            Ok(())
        }),
        None,
    )?;

    library.register(
        ["dump $varname", "I dump $varname"],
        step_fn(|scope, args| {
            let [name] = arity::<1>(args)?;
            let found = if name == "this" {
                Some(scope.snapshot())
            } else {
                scope.find_named(name)?
            };
            let rendered = serde_json::to_string_pretty(&found.unwrap_or(Value::Null))
                .map_err(StepError::foreign)?;
            info!(target: "qa::dump", variable = %name, "{rendered}");
            Ok(())
        }),
        None,
    )?;
    Ok(())
}

fn install_assertions(library: &mut PhraseLibrary) -> Result<(), PatternError> {
    library.register(
        [
            "any $path in $varname should match $regex",
            "any $path in $varname must match $regex",
            "any $path in $varname matches $regex",
        ],
        step_fn(|scope, args| {
            let [path, name, pattern] = arity::<3>(args)?;
            let value = required(scope, name)?;
            let re = compile(pattern)?;
            let found: Vec<Value> = find_all_in_path(&value, path)?
                .into_iter()
                .flat_map(|v| match v {
                    Value::Array(items) => items,
                    other => vec![other],
                })
                .collect();
            StepError::ensure(found.iter().any(|v| re.is_match(&to_text(v))), || {
                format!("No path {path} in {name} matches {pattern}")
            })
        }),
        docs("vars.path", "Assert on JSON paths inside a variable"),
    )?;

    library.register(
        ["$path in $varname should be empty"],
        step_fn(|scope, args| {
            let [path, name] = arity::<2>(args)?;
            let value = required(scope, name)?;
            let found = find_in_path(&value, path)?;
            StepError::ensure(found.as_ref().map_or(true, is_empty), || {
                format!("Variable {name} in {path} is not empty")
            })
        }),
        docs("vars.path", "Assert on JSON paths inside a variable"),
    )?;

    library.register(
        [
            "$path in $varname should contain $match",
            "$path in $varname contains $match",
            "$path in $varname must contain $match",
        ],
        step_fn(|scope, args| {
            let [path, name, needle] = arity::<3>(args)?;
            let value = required(scope, name)?;
            let found = find_in_path(&value, path)?;
            StepError::ensure(
                found.is_some_and(|v| to_text(&v).contains(needle.as_str())),
                || format!("Variable {name} in {path} does not contain {needle}"),
            )
        }),
        docs("vars.path", "Assert on JSON paths inside a variable"),
    )?;

    library.register(
        [
            "$path in $varname should match $regex",
            "$path in $varname must match $regex",
            "$path in $varname matches $regex",
        ],
        step_fn(|scope, args| {
            let [path, name, pattern] = arity::<3>(args)?;
            let value = required(scope, name)?;
            let found = find_in_path(&value, path)?
                .ok_or_else(|| StepError::failed(format!("Path {path} not found in {name}")))?;
            let re = compile(pattern)?;
            StepError::ensure(re.is_match(&to_text(&found)), || {
                format!("No path {path} in {name} matches {pattern}")
            })
        }),
        docs("vars.path", "Assert on JSON paths inside a variable"),
    )?;

    library.register(
        ["variable $varname should contain $value"],
        step_fn(|scope, args| {
            let [name, needle] = arity::<2>(args)?;
            let value = required(scope, name)?;
            StepError::ensure(to_text(&value).contains(needle.as_str()), || {
                format!("Variable {name} does not contain {needle}")
            })
        }),
        None,
    )?;

    library.register(
        [
            "variable $varname should match $regex",
            "variable $varname must match $regex",
        ],
        step_fn(match_variable),
        docs("vars.match", "Assert a variable matches a regular expression"),
    )?;

    library.register(
        [
            "variable $varname should exist",
            "variable $varname exists",
            "$varname should exist",
            "$varname exists",
        ],
        step_fn(|scope, args| {
            let [name] = arity::<1>(args)?;
            let found = scope.find_named(name)?;
            StepError::ensure(found.is_some_and(|v| !v.is_null()), || {
                format!("Variable {name} does not exist")
            })
        }),
        None,
    )?;

    library.register(
        [
            "variable $varname should be $value",
            "$varname should be $value",
            "$varname equals $value",
            "$varname must equal $value",
            "$varname = $value",
        ],
        step_fn(|scope, args| {
            let [name, expected] = arity::<2>(args)?;
            let found = scope
                .find_named(name)?
                .ok_or_else(|| StepError::failed(format!("Variable [{name}] does not exist")))?;
            StepError::ensure(loosely_equals(&found, expected), || {
                format!("Variable {name} does not equal {expected}")
            })
        }),
        docs("vars.equals", "Assert a variable has an exact value"),
    )?;

    library.register(
        ["$path should match $regex", "$path matches $regex", "$path must match $regex"],
        step_fn(match_variable),
        docs("vars.match", "Assert a variable matches a regular expression"),
    )?;
    Ok(())
}

fn match_variable(scope: &mut Scope, args: &[String]) -> Result<(), StepError> {
    let [name, pattern] = arity::<2>(args)?;
    let value = required(scope, name)?;
    let re = compile(pattern)?;
    StepError::ensure(re.is_match(&to_text(&value)), || {
        format!("Variable {name} does not match {pattern}")
    })
}

/// `"true"` and `"false"` become booleans; anything else stays text.
fn literal(value: &str) -> Value {
    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        other => Value::String(other.to_string()),
    }
}

fn required(scope: &Scope, name: &str) -> Result<Value, StepError> {
    scope
        .find_named(name)?
        .filter(|v| !v.is_null())
        .ok_or_else(|| StepError::failed(format!("Variable {name} does not exist")))
}

fn compile(pattern: &str) -> Result<Regex, StepError> {
    Regex::new(pattern).map_err(|e| StepError::failed(format!("invalid regex {pattern}: {e}")))
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
