mod common;
mod scripting;
mod variables;

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::phrase::{PatternError, PhraseLibrary};
use crate::scope::Scope;

pub use common::CommonDialect;
#[cfg(feature = "jexl")]
pub use scripting::JexlScriptEngine;
pub use scripting::{truthy, ScriptEngine, ScriptError, ScriptingDialect};
pub use variables::VariablesDialect;

/// A named bundle of phrases plus the scope defaults those phrases rely on.
pub trait Dialect: Send + Sync {
    fn name(&self) -> &str;

    fn install(&self, library: &mut PhraseLibrary) -> Result<(), PatternError>;

    fn defaults(&self) -> Map<String, Value> {
        Map::new()
    }

    fn scope(&self, scope: &mut Scope) {
        scope.fill_defaults(&self.defaults());
    }
}

/// Built-in dialects in installation order.
///
/// Scripting comes before variables so that `I assert a = b` reaches the
/// script engine instead of the generic `$varname = $value` assertion.
pub fn standard() -> Vec<Arc<dyn Dialect>> {
    let mut dialects: Vec<Arc<dyn Dialect>> = vec![Arc::new(CommonDialect)];
    #[cfg(feature = "jexl")]
    dialects.push(Arc::new(ScriptingDialect::new(Arc::new(JexlScriptEngine))));
    dialects.push(Arc::new(VariablesDialect));
    dialects
}
