//! Delivery incidents. Tied to a shipment through `numexp`; resolution
//! goes through a dedicated member action rather than a plain update.

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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentEtat {
    #[default]
    Ouvert,
    EnCours,
    Resolu,
    Ferme,
    Annule,
}

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "incidents",
    casing: BackendCasing::Snake,
    rules: &[
        FieldRule::both("code_inc", "codeInc", FieldKind::Number),
        FieldRule::both("numexp", "expeditionId", FieldKind::Number),
        FieldRule::read_only("type_display", "typeDisplay", FieldKind::Text),
        FieldRule::read_only("etat_display", "etatDisplay", FieldKind::Text),
        FieldRule::read_only("expedition", "expedition", FieldKind::Text),
        FieldRule::read_only("date_creation", "dateCreation", FieldKind::Date),
        FieldRule::read_only("date_resolution", "dateResolution", FieldKind::Date),
    ],
    id_candidates: &["codeInc", "id"],
    delete_aliases: &["id", "codeInc"],
};

const STATS: &[StatCategory] = &[
    StatCategory::total("total"),
    StatCategory::equals("ouverts", "etat", "OUVERT"),
    StatCategory::equals("enCours", "etat", "EN_COURS"),
    StatCategory::equals("resolus", "etat", "RESOLU"),
];

pub static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    resource: "incidents",
    schema: &SCHEMA,
    stats: STATS,
    insert: InsertOrder::Prepend,
    update_verb: UpdateVerb::Put,
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateIncident {
    /// Incident type code (`RETARD`, `PERTE`, `DOMMAGE`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    pub expedition_id: i64,
    pub commentaire: Option<String>,
    pub wilaya: Option<String>,
    pub commune: Option<String>,
    pub etat: Option<IncidentEtat>,
}

pub struct IncidentStore {
    inner: ResourceStore,
}

impl IncidentStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            inner: ResourceStore::new(gateway, &DESCRIPTOR),
        }
    }

    pub async fn create(&self, input: &CreateIncident) -> Result<Value, StoreError> {
        self.inner.create(Self::payload(input)).await
    }

    /// Full update (PUT). Partial edits can go through
    /// [`ResourceStore::patch_field`].
    pub async fn update(&self, key: &str, input: &CreateIncident) -> Result<Value, StoreError> {
        self.inner.update(key, Self::payload(input)).await
    }

    /// POST `/incidents/{key}/resoudre/` then re-fetch: resolving also
    /// stamps `date_resolution` and may touch the shipment state.
    pub async fn resolve(&self, key: &str, resolution: &str) -> Result<Value, StoreError> {
        self.inner
            .member_action_refetch(key, "resoudre", json!({ "resolution": resolution }))
            .await
    }

    pub async fn statistics(&self) -> Result<Value, StoreError> {
        Ok(self
            .inner
            .gateway()
            .collection_get("incidents", "statistiques")
            .await?)
    }

    fn payload(input: &CreateIncident) -> Payload {
        Payload::new()
            .set("type", input.kind.as_str())
            .set("expeditionId", input.expedition_id)
            .set_opt("commentaire", input.commentaire.as_deref())
            .set_opt("wilaya", input.wilaya.as_deref())
            .set_opt("commune", input.commune.as_deref())
            .set("etat", input.etat.unwrap_or_default().to_string())
    }
}

impl std::ops::Deref for IncidentStore {
    type Target = ResourceStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
