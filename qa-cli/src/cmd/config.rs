use std::path::Path;

use qa_core::vars;
use qa_exec::EngineConfig;
use serde_json::{Map, Value};

use crate::output::print_error;
use crate::{ConfigArgs, OutputArgs};

pub fn load_options(path: Option<&Path>, output: &OutputArgs) -> Option<Map<String, Value>> {
    let Some(path) = path else {
        return Some(Map::new());
    };
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("failed to read options: {e}"));
            return None;
        }
    };
    let parsed = serde_json::from_str::<Value>(&content)
        .ok()
        .or_else(|| serde_yaml::from_str::<Value>(&content).ok());
    match parsed {
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            print_error(output.format, output.quiet, "options file must contain an object");
            None
        }
        None => {
            print_error(output.format, output.quiet, "options file is neither valid JSON nor YAML");
            None
        }
    }
}

/// Applies `KEY=VALUE` overrides by path. `true` and `false` become booleans.
pub fn merge_set_options(options: &mut Map<String, Value>, sets: &[String]) -> Result<(), String> {
    if sets.is_empty() {
        return Ok(());
    }
    let mut root = Value::Object(std::mem::take(options));
    for s in sets {
        let Some((key, raw)) = s.split_once('=') else {
            return Err(format!("invalid --set value (expected KEY=VALUE): {s}"));
        };
        let value = match raw {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => Value::String(other.to_string()),
        };
        vars::set(&mut root, key.trim(), value).map_err(|e| format!("--set {key}: {e}"))?;
    }
    if let Value::Object(map) = root {
        *options = map;
    }
    Ok(())
}

pub fn build_engine_config(config: &ConfigArgs) -> Result<EngineConfig, String> {
    let engine_config = EngineConfig::new();
    if config.no_env {
        return Ok(engine_config);
    }
    engine_config
        .with_env(&config.env_prefix)
        .map_err(|e| format!("failed to bind {}* environment: {e}", config.env_prefix))
}

/// Options file plus `--set` overrides, or `None` after printing the problem.
pub fn scope_options(config: &ConfigArgs, output: &OutputArgs) -> Option<Map<String, Value>> {
    let mut options = load_options(config.options.as_deref(), output)?;
    if let Err(e) = merge_set_options(&mut options, &config.set_options) {
        print_error(output.format, output.quiet, &e);
        return None;
    }
    Some(options)
}
