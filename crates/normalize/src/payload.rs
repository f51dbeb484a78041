//! Outgoing payload construction.
//!
//! Create and update requests send an explicit allow-list of fields, never
//! a blind pass-through of caller input. The builder works in frontend key
//! space; [`Payload::into_backend`] applies the entity schema last.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::{convert::to_backend, schema::EntitySchema};

#[derive(Debug, Default, Clone)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Absent values are omitted from the payload entirely, never sent as
    /// null.
    pub fn set_opt(self, key: &str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    /// Calendar dates go over the wire as `YYYY-MM-DD`.
    pub fn date(self, key: &str, value: NaiveDate) -> Self {
        self.set(key, value.format("%Y-%m-%d").to_string())
    }

    pub fn date_opt(self, key: &str, value: Option<NaiveDate>) -> Self {
        match value {
            Some(d) => self.date(key, d),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    pub fn into_backend(self, schema: &EntitySchema) -> Value {
        to_backend(&Value::Object(self.fields), schema)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::{BackendCasing, EntitySchema, FieldKind, FieldRule};

    static SCHEMA: EntitySchema = EntitySchema {
        entity: "expeditions",
        casing: BackendCasing::Snake,
        rules: &[FieldRule::both("code_client", "clientId", FieldKind::Number)],
        id_candidates: &["code", "id"],
        delete_aliases: &["id", "code"],
    };

    #[test]
    fn none_fields_are_omitted() {
        let value = Payload::new()
            .set("poids", 12.5)
            .set_opt("tarification", None::<&str>)
            .into_value();
        assert_eq!(value, json!({ "poids": 12.5 }));
    }

    #[test]
    fn dates_are_formatted_for_the_backend() {
        let d = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let value = Payload::new().date("date", d).into_value();
        assert_eq!(value, json!({ "date": "2026-03-09" }));
    }

    #[test]
    fn into_backend_applies_schema_renames() {
        let value = Payload::new()
            .set("clientId", 4)
            .set("montantEstime", 100)
            .into_backend(&SCHEMA);
        assert_eq!(value, json!({ "code_client": 4, "montant_estime": 100 }));
    }
}
