//! Fleet vehicles. The registration plate (`matricule`) is the primary
//! key and must be exactly six characters; shorter input is zero-padded
//! on the left.

use std::sync::Arc;

use gateway::{Gateway, UpdateVerb};
use normalize::{BackendCasing, EntitySchema, FieldKind, FieldRule, Payload};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};
use ts_rs::TS;

use crate::{
    error::StoreError,
    stats::StatCategory,
    store::{EntityDescriptor, InsertOrder, ResourceStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum TypeVehicule {
    Moto,
    Voiture,
    Camion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display, Default)]
pub enum VehiculeEtat {
    #[default]
    #[serde(rename = "Opérationnel")]
    #[strum(serialize = "Opérationnel")]
    Operationnel,
    Disponible,
    #[serde(rename = "En mission")]
    #[strum(serialize = "En mission")]
    EnMission,
    #[serde(rename = "En maintenance")]
    #[strum(serialize = "En maintenance")]
    EnMaintenance,
}

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "vehicules",
    casing: BackendCasing::Snake,
    rules: &[
        FieldRule::both("type_vehicule", "typeVehicule", FieldKind::Text),
        FieldRule::both("capacite_poids", "capacitePoids", FieldKind::Number),
        FieldRule::both("capacite_volume", "capaciteVolume", FieldKind::Number),
    ],
    id_candidates: &["matricule", "id"],
    delete_aliases: &["id", "matricule"],
};

const STATS: &[StatCategory] = &[
    StatCategory::total("total"),
    StatCategory::equals("disponibles", "etat", "Disponible"),
    StatCategory::equals("enMission", "etat", "En mission"),
    StatCategory::equals("enMaintenance", "etat", "En maintenance"),
];

pub static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    resource: "vehicules",
    schema: &SCHEMA,
    stats: STATS,
    insert: InsertOrder::Prepend,
    update_verb: UpdateVerb::Put,
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateVehicule {
    pub matricule: String,
    pub type_vehicule: TypeVehicule,
    pub capacite_poids: f64,
    pub capacite_volume: f64,
}

pub struct VehiculeStore {
    inner: ResourceStore,
}

impl VehiculeStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            inner: ResourceStore::new(gateway, &DESCRIPTOR),
        }
    }

    pub async fn create(&self, input: &CreateVehicule) -> Result<Value, StoreError> {
        let matricule = normalize_matricule(&input.matricule)?;
        self.inner
            .create(
                Self::payload(input, &matricule)
                    .set("etat", VehiculeEtat::Operationnel.to_string()),
            )
            .await
    }

    pub async fn update(&self, key: &str, input: &CreateVehicule) -> Result<Value, StoreError> {
        let matricule = normalize_matricule(&input.matricule)?;
        self.inner.update(key, Self::payload(input, &matricule)).await
    }

    pub async fn set_state(&self, matricule: &str, etat: VehiculeEtat) -> Result<Value, StoreError> {
        self.inner
            .patch_field(matricule, "etat", Value::String(etat.to_string()))
            .await
    }

    fn payload(input: &CreateVehicule, matricule: &str) -> Payload {
        Payload::new()
            .set("matricule", matricule)
            .set("typeVehicule", input.type_vehicule.to_string())
            .set("capacitePoids", input.capacite_poids)
            .set("capaciteVolume", input.capacite_volume)
    }
}

impl std::ops::Deref for VehiculeStore {
    type Target = ResourceStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

fn normalize_matricule(raw: &str) -> Result<String, StoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 6 {
        return Err(StoreError::InvalidInput(format!(
            "matricule must be 1 to 6 characters, got {raw:?}"
        )));
    }
    Ok(format!("{trimmed:0>6}"))
}
