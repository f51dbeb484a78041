//! Gateway error taxonomy.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("backend validation failed: {}", summarize(fields))]
    Validation {
        fields: BTreeMap<String, Vec<String>>,
    },
    #[error("unauthorized")]
    Unauthorized,
    #[error("json error: {0}")]
    Serde(String),
}

impl ApiError {
    /// Classify a non-success response. DRF validation errors arrive as a
    /// JSON object mapping field names to lists of messages; everything
    /// else is surfaced as a plain HTTP error.
    pub fn from_response_parts(status: u16, body: &str) -> Self {
        if (400..500).contains(&status) {
            if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
                let mut map = BTreeMap::new();
                for (field, messages) in &fields {
                    match messages {
                        Value::Array(items) => {
                            let msgs: Vec<String> = items
                                .iter()
                                .filter_map(|m| m.as_str().map(str::to_string))
                                .collect();
                            if msgs.len() == items.len() && !msgs.is_empty() {
                                map.insert(field.clone(), msgs);
                            } else {
                                return Self::Http {
                                    status,
                                    body: body.to_string(),
                                };
                            }
                        }
                        Value::String(msg) => {
                            map.insert(field.clone(), vec![msg.clone()]);
                        }
                        _ => {
                            return Self::Http {
                                status,
                                body: body.to_string(),
                            };
                        }
                    }
                }
                if !map.is_empty() {
                    return Self::Validation { fields: map };
                }
            }
        }
        Self::Http {
            status,
            body: body.to_string(),
        }
    }
}

pub(crate) fn map_reqwest_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Transport(e.to_string())
    }
}

fn summarize(fields: &BTreeMap<String, Vec<String>>) -> String {
    fields
        .iter()
        .map(|(field, msgs)| format!("{field}: {}", msgs.join("; ")))
        .collect::<Vec<_>>()
        .join(", ")
}
