//! Recursive key conversion over JSON payloads.

use serde_json::{Map, Value};

use crate::{
    key::{backend_key, normalize_key},
    schema::{Direction, EntitySchema, FieldKind},
};

/// Translate a backend payload to the frontend shape.
///
/// Recurses through arrays and nested objects; scalars pass through
/// unchanged, so malformed input is returned as-is rather than failing.
/// Keys go through the generic casing conversion first, then the schema's
/// override table. `Number` rules coerce string values to numbers. The
/// result always carries an `id` field taken from the first non-null
/// identifier candidate when one is present.
pub fn to_frontend(value: &Value, schema: &EntitySchema) -> Value {
    match value {
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| to_frontend(v, schema)).collect())
        }
        Value::Object(fields) => {
            let mut out = Map::with_capacity(fields.len() + 1);
            for (k, v) in fields {
                let nk = normalize_key(k);
                let rule = schema.rule_for_normalized(&nk);
                let fk = rule.map_or(nk, |r| r.frontend.to_string());
                let converted = match v {
                    Value::Array(_) | Value::Object(_) => to_frontend(v, schema),
                    scalar => coerce(scalar, rule.map(|r| r.kind)),
                };
                out.insert(fk, converted);
            }
            inject_id(&mut out, schema);
            Value::Object(out)
        }
        scalar => scalar.clone(),
    }
}

/// Translate a frontend object back to backend field names. Read-only
/// fields are dropped; keys without a rule fall back to the schema's
/// default casing. Null values pass through (absence is expressed by not
/// inserting the key at all, see [`crate::payload::Payload`]).
pub fn to_backend(value: &Value, schema: &EntitySchema) -> Value {
    match value {
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| to_backend(v, schema)).collect())
        }
        Value::Object(fields) => {
            let mut out = Map::with_capacity(fields.len());
            for (k, v) in fields {
                let bk = match schema.rule_for_frontend(k) {
                    Some(rule) if rule.direction == Direction::FrontendOnly => continue,
                    Some(rule) => rule.backend.to_string(),
                    None => backend_key(k, schema.casing),
                };
                let converted = match v {
                    Value::Array(_) | Value::Object(_) => to_backend(v, schema),
                    scalar => scalar.clone(),
                };
                out.insert(bk, converted);
            }
            Value::Object(out)
        }
        scalar => scalar.clone(),
    }
}

/// String rendition of the first present, non-null identifier candidate.
/// Identifiers are always compared as strings so a numeric backend id
/// still matches a string key.
pub fn resolve_id(value: &Value, candidates: &[&str]) -> Option<String> {
    let fields = value.as_object()?;
    candidates
        .iter()
        .find_map(|c| fields.get(*c).and_then(string_key))
}

/// Render a scalar value as a comparison key. Objects and arrays do not
/// identify a record and yield `None`.
pub fn string_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn inject_id(fields: &mut Map<String, Value>, schema: &EntitySchema) {
    let has_id = fields.get("id").is_some_and(|v| !v.is_null());
    if has_id {
        return;
    }
    let candidate = schema
        .id_candidates
        .iter()
        .find_map(|c| fields.get(*c).filter(|v| !v.is_null()).cloned());
    if let Some(v) = candidate {
        fields.insert("id".to_string(), v);
    }
}

fn coerce(value: &Value, kind: Option<FieldKind>) -> Value {
    match (kind, value) {
        // Decimal fields arrive as strings from the backend serializer.
        (Some(FieldKind::Number), Value::String(s)) => match s.parse::<f64>() {
            Ok(n) => serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or_else(|| value.clone()),
            Err(_) => value.clone(),
        },
        _ => value.clone(),
    }
}
