//! Delivery rounds. A round binds a vehicle and a driver to a date;
//! shipments are attached afterwards in bulk, which cascades into
//! shipment and driver state on the backend.

use std::sync::Arc;

use chrono::NaiveDate;
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
pub enum TourneeStatut {
    #[default]
    #[serde(rename = "Planifiée")]
    #[strum(serialize = "Planifiée")]
    Planifiee,
    #[serde(rename = "En cours")]
    #[strum(serialize = "En cours")]
    EnCours,
    #[serde(rename = "Terminée")]
    #[strum(serialize = "Terminée")]
    Terminee,
}

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "tournees",
    casing: BackendCasing::Snake,
    rules: &[
        FieldRule::both("code_t", "codeT", FieldKind::Text),
        FieldRule::both("date_tournee", "dateTournee", FieldKind::Date),
        FieldRule::read_only("chauffeur_nom", "chauffeurNom", FieldKind::Text),
        FieldRule::read_only("nb_expeditions", "nbExpeditions", FieldKind::Number),
    ],
    id_candidates: &["codeT", "id"],
    delete_aliases: &["id", "codeT"],
};

const STATS: &[StatCategory] = &[
    StatCategory::total("total"),
    StatCategory::today("aujourdHui", "dateTournee"),
    StatCategory::equals("planifiees", "statut", "Planifiée"),
    StatCategory::equals("enCours", "statut", "En cours"),
    StatCategory::equals("terminees", "statut", "Terminée"),
];

pub static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    resource: "tournees",
    schema: &SCHEMA,
    stats: STATS,
    insert: InsertOrder::Prepend,
    update_verb: UpdateVerb::Put,
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTournee {
    /// `Tour-N`, generated from the loaded list when absent.
    pub code_t: Option<String>,
    pub date_tournee: NaiveDate,
    /// Vehicle matricule.
    pub vehicule: String,
    /// Driver code.
    pub chauffeur: String,
    pub statut: Option<TourneeStatut>,
}

pub struct TourneeStore {
    inner: ResourceStore,
}

impl TourneeStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            inner: ResourceStore::new(gateway, &DESCRIPTOR),
        }
    }

    pub async fn create(&self, input: &CreateTournee) -> Result<Value, StoreError> {
        let code = match &input.code_t {
            Some(code) => code.clone(),
            None => next_code(&self.inner.records(), "codeT", "Tour-"),
        };
        self.inner.create(Self::payload(input, &code)).await
    }

    pub async fn update(&self, key: &str, input: &CreateTournee) -> Result<Value, StoreError> {
        let code = input.code_t.clone().unwrap_or_else(|| key.to_string());
        self.inner.update(key, Self::payload(input, &code)).await
    }

    pub async fn set_status(&self, key: &str, statut: TourneeStatut) -> Result<Value, StoreError> {
        self.inner
            .patch_field(key, "statut", Value::String(statut.to_string()))
            .await
    }

    /// Replace the round's shipment set. The backend moves the shipments
    /// into transit and flips the driver unavailable, so the whole list is
    /// re-fetched instead of splicing the response.
    pub async fn assign_expeditions(
        &self,
        key: &str,
        expedition_ids: &[i64],
    ) -> Result<Value, StoreError> {
        let body = Payload::new()
            .set("expeditions", expedition_ids.to_vec())
            .into_backend(&SCHEMA);
        let raw = self
            .inner
            .gateway()
            .update("tournees", key, &body, UpdateVerb::Patch)
            .await?;
        let response = normalize::to_frontend(&raw, &SCHEMA);
        self.inner.fetch_all().await?;
        Ok(response)
    }

    fn payload(input: &CreateTournee, code: &str) -> Payload {
        Payload::new()
            .set("codeT", code)
            .date("dateTournee", input.date_tournee)
            .set("vehicule", input.vehicule.as_str())
            .set("chauffeur", input.chauffeur.as_str())
            .set("statut", input.statut.unwrap_or_default().to_string())
    }
}

impl std::ops::Deref for TourneeStore {
    type Target = ResourceStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statut_round_trips_accented_labels() {
        assert_eq!(TourneeStatut::Planifiee.to_string(), "Planifiée");
        let parsed: TourneeStatut = serde_json::from_str("\"Terminée\"").unwrap();
        assert_eq!(parsed, TourneeStatut::Terminee);
        assert_eq!(TourneeStatut::default(), TourneeStatut::Planifiee);
    }
}
