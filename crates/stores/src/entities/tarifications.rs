//! Tariff grids. One grid per destination and service level; shipment
//! pricing combines the base rate with per-kg and per-m³ components.

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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display, Default)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum TypeService {
    #[default]
    Standard,
    Express,
    International,
}

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "tarifications",
    casing: BackendCasing::Snake,
    rules: &[
        FieldRule::both("code_tarif", "codeTarif", FieldKind::Text),
        FieldRule::both("type_service", "typeService", FieldKind::Text),
        FieldRule::both(
            "tarif_base_destination",
            "tarifBaseDestination",
            FieldKind::Number,
        ),
        FieldRule::both("tarif_poids", "tarifPoids", FieldKind::Number),
        FieldRule::both("tarif_volume", "tarifVolume", FieldKind::Number),
        FieldRule::read_only("destination_ville", "destinationVille", FieldKind::Text),
    ],
    id_candidates: &["codeTarif", "id"],
    delete_aliases: &["id", "codeTarif"],
};

const STATS: &[StatCategory] = &[StatCategory::total("total")];

pub static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    resource: "tarifications",
    schema: &SCHEMA,
    stats: STATS,
    insert: InsertOrder::Prepend,
    update_verb: UpdateVerb::Put,
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTarification {
    pub type_service: TypeService,
    pub tarif_base_destination: Option<f64>,
    pub tarif_poids: f64,
    pub tarif_volume: f64,
    /// Destination code (`Des-N`).
    pub destination: String,
}

pub struct TarificationStore {
    inner: ResourceStore,
}

impl TarificationStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            inner: ResourceStore::new(gateway, &DESCRIPTOR),
        }
    }

    /// The backend accepts a client-supplied `code_tarif`; `Tar-N` is
    /// derived from the loaded list.
    pub async fn create(&self, input: &CreateTarification) -> Result<Value, StoreError> {
        let code = next_code(&self.inner.records(), "codeTarif", "Tar-");
        self.inner.create(Self::payload(input, &code)).await
    }

    pub async fn update(
        &self,
        key: &str,
        input: &CreateTarification,
    ) -> Result<Value, StoreError> {
        self.inner.update(key, Self::payload(input, key)).await
    }

    fn payload(input: &CreateTarification, code: &str) -> Payload {
        Payload::new()
            .set("codeTarif", code)
            .set("typeService", input.type_service.to_string())
            .set(
                "tarifBaseDestination",
                input.tarif_base_destination.unwrap_or(0.0),
            )
            .set("tarifPoids", input.tarif_poids)
            .set("tarifVolume", input.tarif_volume)
            .set("destination", input.destination.as_str())
    }
}

impl std::ops::Deref for TarificationStore {
    type Target = ResourceStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
