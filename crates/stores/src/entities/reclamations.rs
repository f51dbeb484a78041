//! Customer complaints ("réclamations"). PascalCase backend fields with
//! an acronym key (`CodeREC`); updates go through PATCH.

use std::sync::Arc;

use gateway::{Gateway, UpdateVerb};
use normalize::{BackendCasing, EntitySchema, FieldKind, FieldRule, Payload};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

use crate::{
    error::StoreError,
    stats::StatCategory,
    store::{EntityDescriptor, InsertOrder, ResourceStore},
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display, Default,
)]
pub enum ReclamationEtat {
    #[default]
    Nouvelle,
    #[serde(rename = "En cours")]
    #[strum(serialize = "En cours")]
    EnCours,
    #[serde(rename = "Résolue")]
    #[strum(serialize = "Résolue")]
    Resolue,
    #[serde(rename = "Annulée")]
    #[strum(serialize = "Annulée")]
    Annulee,
}

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "reclamations",
    casing: BackendCasing::Pascal,
    rules: &[
        FieldRule::both("CodeREC", "codeRec", FieldKind::Number),
        FieldRule::both("CodeClient", "clientId", FieldKind::Number),
        // The one lowercase field on this resource.
        FieldRule::both("description", "description", FieldKind::Text),
    ],
    id_candidates: &["codeRec", "id"],
    delete_aliases: &["id", "codeRec"],
};

const STATS: &[StatCategory] = &[
    StatCategory::total("total"),
    StatCategory::equals("nouvelles", "etat", "Nouvelle"),
    StatCategory::equals("enCours", "etat", "En cours"),
    StatCategory::equals("resolues", "etat", "Résolue"),
];

pub static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    resource: "reclamations",
    schema: &SCHEMA,
    stats: STATS,
    insert: InsertOrder::Prepend,
    update_verb: UpdateVerb::Patch,
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateReclamation {
    pub nature: String,
    pub description: Option<String>,
    pub client_id: i64,
}

pub struct ReclamationStore {
    inner: ResourceStore,
}

impl ReclamationStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            inner: ResourceStore::new(gateway, &DESCRIPTOR),
        }
    }

    /// New complaints always open in the `Nouvelle` state.
    pub async fn create(&self, input: &CreateReclamation) -> Result<Value, StoreError> {
        let payload = Payload::new()
            .set("nature", input.nature.as_str())
            .set_opt("description", input.description.as_deref())
            .set("clientId", input.client_id)
            .set("etat", ReclamationEtat::default().to_string());
        self.inner.create(payload).await
    }

    pub async fn set_status(&self, key: &str, etat: ReclamationEtat) -> Result<Value, StoreError> {
        self.inner
            .patch_field(key, "etat", json!(etat.to_string()))
            .await
    }
}

impl std::ops::Deref for ReclamationStore {
    type Target = ResourceStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accented_states_round_trip() {
        assert_eq!(ReclamationEtat::Resolue.to_string(), "Résolue");
        assert_eq!(
            serde_json::from_value::<ReclamationEtat>(json!("En cours")).unwrap(),
            ReclamationEtat::EnCours
        );
    }
}
