//! List response handling.

use serde_json::Value;

/// Extract the item array from a list response. The backend returns
/// either a bare array or a DRF paginated envelope `{results: [...]}`;
/// both yield identical output for identical item content. Anything else
/// is treated as an empty collection.
pub fn extract_results(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut fields) => match fields.remove("results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
