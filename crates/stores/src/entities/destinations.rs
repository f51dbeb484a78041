//! Served destinations, one per city, grouped by geographic zone for
//! tariff lookup.

use std::sync::Arc;

use gateway::{Gateway, UpdateVerb};
use normalize::{BackendCasing, EntitySchema, FieldKind, FieldRule, Payload};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};
use ts_rs::TS;

use crate::{
    entities::next_code,
    error::StoreError,
    stats::StatCategory,
    store::{EntityDescriptor, InsertOrder, ResourceStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ZoneGeo {
    Nord,
    Sud,
    Est,
    Ouest,
    Centre,
    International,
}

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "destinations",
    casing: BackendCasing::Snake,
    rules: &[
        FieldRule::both("code_d", "codeD", FieldKind::Text),
        FieldRule::both("zone_geo", "zoneGeo", FieldKind::Text),
    ],
    id_candidates: &["codeD", "id"],
    delete_aliases: &["id", "codeD"],
};

const STATS: &[StatCategory] = &[
    StatCategory::total("total"),
    StatCategory::equals("nord", "zoneGeo", "NORD"),
    StatCategory::equals("sud", "zoneGeo", "SUD"),
    StatCategory::equals("est", "zoneGeo", "EST"),
    StatCategory::equals("ouest", "zoneGeo", "OUEST"),
    StatCategory::equals("centre", "zoneGeo", "CENTRE"),
    StatCategory::equals("international", "zoneGeo", "INTERNATIONAL"),
];

pub static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    resource: "destinations",
    schema: &SCHEMA,
    stats: STATS,
    insert: InsertOrder::Prepend,
    update_verb: UpdateVerb::Put,
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateDestination {
    pub ville: String,
    /// Defaults to "Algérie".
    pub pays: Option<String>,
    pub zone_geo: ZoneGeo,
}

pub struct DestinationStore {
    inner: ResourceStore,
}

impl DestinationStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            inner: ResourceStore::new(gateway, &DESCRIPTOR),
        }
    }

    /// The backend accepts a client-supplied `code_d`; `Des-N` is derived
    /// from the loaded list.
    pub async fn create(&self, input: &CreateDestination) -> Result<Value, StoreError> {
        let code = next_code(&self.inner.records(), "codeD", "Des-");
        self.inner.create(Self::payload(input, &code)).await
    }

    pub async fn update(&self, key: &str, input: &CreateDestination) -> Result<Value, StoreError> {
        self.inner.update(key, Self::payload(input, key)).await
    }

    fn payload(input: &CreateDestination, code: &str) -> Payload {
        Payload::new()
            .set("codeD", code)
            .set("ville", input.ville.as_str())
            .set("pays", input.pays.as_deref().unwrap_or("Algérie"))
            .set("zoneGeo", input.zone_geo.to_string())
    }
}

impl std::ops::Deref for DestinationStore {
    type Target = ResourceStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
