use qa_core::vars;
use qa_core::VarsError;
use serde_json::{Map, Value};
use tracing::debug;

/// Property bag shared by every step of a run.
///
/// Always a JSON object at the root. Nested values are addressed with the
/// dotted paths understood by [`qa_core::vars`].
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    properties: Value,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        Self {
            properties: Value::Object(Map::new()),
        }
    }

    pub fn from_map(properties: Map<String, Value>) -> Self {
        Self {
            properties: Value::Object(properties),
        }
    }

    pub fn from_value(value: Value) -> Result<Self, VarsError> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            Value::Null => Ok(Self::new()),
            _ => Err(VarsError::InvalidScope),
        }
    }

    /// Copies every entry of `defaults` that the scope does not define yet.
    /// Nested objects are filled recursively; existing values always win.
    pub fn fill_defaults(&mut self, defaults: &Map<String, Value>) {
        if let Value::Object(target) = &mut self.properties {
            fill_gaps(target, defaults);
        }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        vars::get(&self.properties, path)
    }

    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<(), VarsError> {
        let value = value.into();
        debug!(path, %value, "set variable");
        vars::set(&mut self.properties, path, value)?;
        Ok(())
    }

    pub fn remove(&mut self, path: &str) -> Option<Value> {
        debug!(path, "unset variable");
        vars::remove(&mut self.properties, path)
    }

    pub fn find_named(&self, name: &str) -> Result<Option<Value>, VarsError> {
        vars::find_named(&self.properties, name)
    }

    pub fn render(&self, template: &str) -> Result<String, VarsError> {
        vars::render(template, &self.properties)
    }

    pub fn clear(&mut self) {
        self.properties = Value::Object(Map::new());
    }

    pub fn snapshot(&self) -> Value {
        self.properties.clone()
    }

    pub fn as_value(&self) -> &Value {
        &self.properties
    }

    pub fn into_value(self) -> Value {
        self.properties
    }

    pub fn is_empty(&self) -> bool {
        self.properties.as_object().map_or(true, Map::is_empty)
    }
}

fn fill_gaps(target: &mut Map<String, Value>, defaults: &Map<String, Value>) {
    for (key, default) in defaults {
        match target.get_mut(key) {
            None => {
                target.insert(key.clone(), default.clone());
            }
            Some(Value::Object(existing)) => {
                if let Value::Object(nested) = default {
                    fill_gaps(existing, nested);
                }
            }
            Some(_) => {}
        }
    }
}
