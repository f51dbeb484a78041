//! Client accounts. The backend uses PascalCase field names for this
//! resource (`CodeClient`, `Nom`, `Tel`, ...).

use std::sync::Arc;

use gateway::{Gateway, UpdateVerb};
use normalize::{BackendCasing, EntitySchema, FieldKind, FieldRule, Payload};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::{
    error::StoreError,
    stats::StatCategory,
    store::{EntityDescriptor, InsertOrder, ResourceStore},
};

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "clients",
    casing: BackendCasing::Pascal,
    rules: &[FieldRule::both("Solde", "solde", FieldKind::Number)],
    id_candidates: &["codeClient", "id", "email"],
    delete_aliases: &["id", "codeClient", "email"],
};

const STATS: &[StatCategory] = &[StatCategory::total("total")];

pub static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    resource: "clients",
    schema: &SCHEMA,
    stats: STATS,
    insert: InsertOrder::Append,
    update_verb: UpdateVerb::Put,
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateClient {
    pub nom: String,
    pub prenom: String,
    pub adresse: String,
    pub tel: String,
    pub email: String,
    pub solde: Option<f64>,
}

pub struct ClientStore {
    inner: ResourceStore,
}

impl ClientStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            inner: ResourceStore::new(gateway, &DESCRIPTOR),
        }
    }

    pub async fn create(&self, input: &CreateClient) -> Result<Value, StoreError> {
        self.inner.create(Self::payload(input)).await
    }

    pub async fn update(&self, key: &str, input: &CreateClient) -> Result<Value, StoreError> {
        self.inner.update(key, Self::payload(input)).await
    }

    fn payload(input: &CreateClient) -> Payload {
        Payload::new()
            .set("nom", input.nom.as_str())
            .set("prenom", input.prenom.as_str())
            .set("adresse", input.adresse.as_str())
            .set("tel", input.tel.as_str())
            .set("email", input.email.as_str())
            .set_opt("solde", input.solde)
    }
}

impl std::ops::Deref for ClientStore {
    type Target = ResourceStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
