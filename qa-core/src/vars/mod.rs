//! Path-addressable access to nested JSON values.
//!
//! Paths use dots and brackets interchangeably: `a.b[0].c` and `a.b.0.c`
//! address the same value. Lookups never fail on a missing segment; they
//! return `None`.

mod query;
mod template;

use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::VarsError;

pub use query::{find_all_in_path, find_in_path};
pub use template::{parse_template, render, Segment, Template};

static INDEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[\s*['"]?([^\]'"]*)['"]?\s*\]"#).expect("valid regex")
});

static NON_ALNUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("valid regex"));

pub fn split_path(path: &str) -> Vec<String> {
    let dotted = INDEX_RE.replace_all(path.trim(), ".$1");
    dotted
        .trim_start_matches('.')
        .split('.')
        .map(str::to_string)
        .collect()
}

pub fn get<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.trim().is_empty() {
        return None;
    }
    split_path(path)
        .iter()
        .try_fold(value, |cur, seg| child(cur, seg))
}

/// Writes `value` at `path`, creating intermediate objects on the way.
pub fn set<'a>(root: &'a mut Value, path: &str, value: Value) -> Result<&'a mut Value, VarsError> {
    if path.trim().is_empty() {
        return Err(VarsError::EmptyPath);
    }
    let segments = split_path(path);
    let (last, parents) = segments.split_last().ok_or(VarsError::EmptyPath)?;

    let mut cur = root;
    for seg in parents {
        cur = child_or_insert(cur, seg)?;
    }
    put(cur, last, value)
}

pub fn remove(root: &mut Value, path: &str) -> Option<Value> {
    if path.trim().is_empty() {
        return None;
    }
    let segments = split_path(path);
    let (last, parents) = segments.split_last()?;

    let mut cur = root;
    for seg in parents {
        cur = child_mut(cur, seg)?;
    }
    match cur {
        Value::Object(map) => map.remove(last.as_str()),
        Value::Array(items) => {
            let idx = last.parse::<usize>().ok()?;
            (idx < items.len()).then(|| items.remove(idx))
        }
        _ => None,
    }
}

pub fn find<'a>(scope: &'a Value, name: &str) -> Result<Option<&'a Value>, VarsError> {
    if !scope.is_object() {
        return Err(VarsError::InvalidScope);
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(VarsError::EmptyPath);
    }
    Ok(get(scope, name))
}

/// A plain variable first; failing that, a JSONPath query against the whole scope.
///
/// Names without a leading `$` are queried from the root (`items[*].id` runs
/// as `$.items[*].id`). A name that is not valid JSONPath is simply not found.
pub fn find_named(scope: &Value, name: &str) -> Result<Option<Value>, VarsError> {
    let name = name.trim();
    if let Some(found) = find(scope, name)? {
        return Ok(Some(found.clone()));
    }
    match find_in_path(scope, &rooted(name)) {
        Err(VarsError::JsonPath { .. }) => Ok(None),
        other => other,
    }
}

fn rooted(name: &str) -> String {
    if name.starts_with('$') {
        name.to_string()
    } else if name.starts_with('[') || name.starts_with('.') {
        format!("${name}")
    } else {
        format!("$.{name}")
    }
}

/// Binds every `vars` entry whose key starts with `prefix` into `config`.
///
/// `PREFIX_A_B=v` lands at path `a.b`. Returns how many entries were bound.
pub fn env<I, K, V>(prefix: &str, vars: I, config: &mut Value) -> Result<usize, VarsError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut bound = 0;
    for (key, value) in vars {
        let Some(rest) = key.as_ref().strip_prefix(prefix) else {
            continue;
        };
        let path = rest.to_lowercase().replace('_', ".");
        if path.trim_matches('.').is_empty() {
            continue;
        }
        set(config, &path, Value::String(value.into()))?;
        bound += 1;
    }
    Ok(bound)
}

pub fn sanitize(text: &str, substitute: &str) -> String {
    NON_ALNUM_RE
        .replace_all(text, NoExpand(substitute))
        .into_owned()
}

/// Stable SHA-256 hex digest, used wherever an identifier must be derived from text.
pub fn digest(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Loose comparison used by assertions: strings compare as-is, scalars by their text form.
pub fn loosely_equals(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s == expected,
        Value::Bool(b) => expected == if *b { "true" } else { "false" },
        Value::Number(n) => {
            n.to_string() == expected
                || matches!((n.as_f64(), expected.parse::<f64>()), (Some(a), Ok(b)) if a == b)
        }
        Value::Null => expected == "null",
        other => other.to_string() == expected,
    }
}

/// Text form of a value: strings unquoted, everything else as JSON.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn child<'a>(value: &'a Value, seg: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(seg),
        Value::Array(items) => seg.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Value, seg: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(seg),
        Value::Array(items) => seg.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
        _ => None,
    }
}

fn child_or_insert<'a>(value: &'a mut Value, seg: &str) -> Result<&'a mut Value, VarsError> {
    if value.is_null() {
        *value = Value::Object(Map::new());
    }
    let slot = match value {
        Value::Object(map) => map.entry(seg.to_string()).or_insert(Value::Null),
        Value::Array(items) => {
            let idx = array_index(seg, items.len())?;
            if idx == items.len() {
                items.push(Value::Null);
            }
            &mut items[idx]
        }
        _ => {
            return Err(VarsError::NotAContainer {
                segment: seg.to_string(),
            })
        }
    };
    if slot.is_null() {
        *slot = Value::Object(Map::new());
    }
    Ok(slot)
}

fn put<'a>(target: &'a mut Value, seg: &str, value: Value) -> Result<&'a mut Value, VarsError> {
    if target.is_null() {
        *target = Value::Object(Map::new());
    }
    match target {
        Value::Object(map) => {
            let slot = map.entry(seg.to_string()).or_insert(Value::Null);
            *slot = value;
            Ok(slot)
        }
        Value::Array(items) => {
            let idx = array_index(seg, items.len())?;
            if idx == items.len() {
                items.push(value);
            } else {
                items[idx] = value;
            }
            Ok(&mut items[idx])
        }
        _ => Err(VarsError::NotAContainer {
            segment: seg.to_string(),
        }),
    }
}

/// Existing index, or one past the end to append.
fn array_index(seg: &str, len: usize) -> Result<usize, VarsError> {
    let idx = seg.parse::<usize>().map_err(|_| VarsError::NotAContainer {
        segment: seg.to_string(),
    })?;
    if idx > len {
        return Err(VarsError::IndexOutOfRange {
            segment: seg.to_string(),
        });
    }
    Ok(idx)
}
