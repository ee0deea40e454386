use qa_core::vars;
use qa_core::VarsError;
use serde_json::{Map, Value};

pub const DEFAULT_ENV_PREFIX: &str = "QA_";

/// Base properties seeded into every scope the engine creates.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub properties: Map<String, Value>,
    pub env_prefix: Option<String>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties.extend(properties);
        self
    }

    pub fn with_property(mut self, path: &str, value: impl Into<Value>) -> Result<Self, VarsError> {
        self.update(|props| vars::set(props, path, value.into()).map(|_| ()))?;
        Ok(self)
    }

    /// Binds every process environment variable starting with `prefix`.
    pub fn with_env(self, prefix: &str) -> Result<Self, VarsError> {
        self.bind_env(prefix, std::env::vars())
    }

    pub fn bind_env<I, K, V>(mut self, prefix: &str, env: I) -> Result<Self, VarsError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.update(|props| vars::env(prefix, env, props).map(|_| ()))?;
        self.env_prefix = Some(prefix.to_string());
        Ok(self)
    }

    fn update<F>(&mut self, f: F) -> Result<(), VarsError>
    where
        F: FnOnce(&mut Value) -> Result<(), VarsError>,
    {
        let mut props = Value::Object(std::mem::take(&mut self.properties));
        let outcome = f(&mut props);
        if let Value::Object(map) = props {
            self.properties = map;
        }
        outcome
    }
}
