use serde_json::Value;
use serde_json_path::JsonPath;

use crate::error::VarsError;

/// First JSONPath match in `body`. A string body is parsed as JSON first.
pub fn find_in_path(body: &Value, path: &str) -> Result<Option<Value>, VarsError> {
    Ok(find_all_in_path(body, path)?.into_iter().next())
}

pub fn find_all_in_path(body: &Value, path: &str) -> Result<Vec<Value>, VarsError> {
    let parsed;
    let doc = match body {
        Value::String(text) => {
            parsed = serde_json::from_str::<Value>(text)?;
            &parsed
        }
        other => other,
    };

    let query = JsonPath::parse(path.trim()).map_err(|e| VarsError::JsonPath {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    Ok(query.query(doc).all().into_iter().cloned().collect())
}
