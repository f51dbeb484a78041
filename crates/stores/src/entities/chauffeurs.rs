//! Drivers. Availability is a plain boolean (`statut_dispo`) toggled
//! through a single-field PATCH.

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
pub enum CategoriePermis {
    A,
    B,
    C,
}

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "chauffeurs",
    casing: BackendCasing::Snake,
    rules: &[
        FieldRule::both("code_chauffeur", "codeChauffeur", FieldKind::Text),
        FieldRule::both("num_permis", "numeroPermis", FieldKind::Text),
        FieldRule::both("categorie_permis", "categoriePermis", FieldKind::Text),
        FieldRule::both("statut_dispo", "statutDispo", FieldKind::Boolean),
    ],
    id_candidates: &["codeChauffeur", "id"],
    delete_aliases: &["id", "codeChauffeur"],
};

const STATS: &[StatCategory] = &[
    StatCategory::total("total"),
    StatCategory::equals("disponibles", "statutDispo", "true"),
    StatCategory::equals("enMission", "statutDispo", "false"),
];

pub static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    resource: "chauffeurs",
    schema: &SCHEMA,
    stats: STATS,
    insert: InsertOrder::Prepend,
    update_verb: UpdateVerb::Put,
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateChauffeur {
    /// `CH-N`, generated from the loaded list when absent.
    pub code_chauffeur: Option<String>,
    pub nom: String,
    pub numero_permis: String,
    pub categorie_permis: CategoriePermis,
    /// Defaults to available.
    pub disponible: Option<bool>,
}

pub struct ChauffeurStore {
    inner: ResourceStore,
}

impl ChauffeurStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            inner: ResourceStore::new(gateway, &DESCRIPTOR),
        }
    }

    pub async fn create(&self, input: &CreateChauffeur) -> Result<Value, StoreError> {
        let code = match &input.code_chauffeur {
            Some(code) => code.clone(),
            None => next_code(&self.inner.records(), "codeChauffeur", "CH-"),
        };
        self.inner.create(Self::payload(input, &code)).await
    }

    pub async fn update(&self, key: &str, input: &CreateChauffeur) -> Result<Value, StoreError> {
        let code = input
            .code_chauffeur
            .clone()
            .unwrap_or_else(|| key.to_string());
        self.inner.update(key, Self::payload(input, &code)).await
    }

    pub async fn set_availability(&self, key: &str, available: bool) -> Result<Value, StoreError> {
        self.inner
            .patch_field(key, "statutDispo", Value::Bool(available))
            .await
    }

    fn payload(input: &CreateChauffeur, code: &str) -> Payload {
        Payload::new()
            .set("codeChauffeur", code)
            .set("nom", input.nom.as_str())
            .set("numeroPermis", input.numero_permis.as_str())
            .set("categoriePermis", input.categorie_permis.to_string())
            .set("statutDispo", input.disponible.unwrap_or(true))
    }
}

impl std::ops::Deref for ChauffeurStore {
    type Target = ResourceStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
