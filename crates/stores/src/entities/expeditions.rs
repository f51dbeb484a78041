//! Shipments ("expéditions"). The backend keys them by `numexp`, which
//! the frontend exposes as `code`; several serializer fields are
//! read-only and must never be sent back.

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

/// Shipment lifecycle as the backend encodes it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpeditionStatut {
    #[default]
    EnAttente,
    EnPreparation,
    EnTransit,
    EnCentreTri,
    EnCoursLivraison,
    Livre,
    EchecLivraison,
    Retour,
}

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "expeditions",
    casing: BackendCasing::Snake,
    rules: &[
        FieldRule::both("numexp", "code", FieldKind::Number),
        FieldRule::both("code_client", "clientId", FieldKind::Number),
        FieldRule::both("poids", "poids", FieldKind::Number),
        FieldRule::both("volume", "volume", FieldKind::Number),
        FieldRule::both("montant_estime", "montantEstime", FieldKind::Number),
        FieldRule::read_only("client_nom", "client", FieldKind::Text),
        FieldRule::read_only("statut_display", "statutDisplay", FieldKind::Text),
        FieldRule::read_only("peut_etre_modifie", "peutEtreModifie", FieldKind::Boolean),
        FieldRule::read_only("peut_etre_supprime", "peutEtreSupprime", FieldKind::Boolean),
        FieldRule::read_only("nb_incidents", "nbIncidents", FieldKind::Number),
        FieldRule::read_only("date_creation", "dateCreation", FieldKind::Date),
        FieldRule::read_only("date_modification", "dateModification", FieldKind::Date),
    ],
    id_candidates: &["code", "id"],
    delete_aliases: &["id", "code"],
};

const STATS: &[StatCategory] = &[
    StatCategory::total("total"),
    StatCategory::equals("enAttente", "statut", "EN_ATTENTE"),
    StatCategory::equals("enPreparation", "statut", "EN_PREPARATION"),
    StatCategory::equals("enTransit", "statut", "EN_TRANSIT"),
    StatCategory::equals("enCentreTri", "statut", "EN_CENTRE_TRI"),
    StatCategory::equals("enCoursLivraison", "statut", "EN_COURS_LIVRAISON"),
    StatCategory::equals("livrees", "statut", "LIVRE"),
    StatCategory::equals("echecs", "statut", "ECHEC_LIVRAISON"),
    StatCategory::equals("retours", "statut", "RETOUR"),
];

pub static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    resource: "expeditions",
    schema: &SCHEMA,
    stats: STATS,
    insert: InsertOrder::Prepend,
    update_verb: UpdateVerb::Put,
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateExpedition {
    pub poids: f64,
    pub volume: f64,
    pub statut: Option<ExpeditionStatut>,
    pub client_id: i64,
    /// Tarification code; the backend computes `montant_estime` from it.
    pub tarification: Option<String>,
    pub description: Option<String>,
}

pub struct ExpeditionStore {
    inner: ResourceStore,
}

impl ExpeditionStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            inner: ResourceStore::new(gateway, &DESCRIPTOR),
        }
    }

    pub async fn create(&self, input: &CreateExpedition) -> Result<Value, StoreError> {
        self.inner.create(Self::payload(input)).await
    }

    pub async fn update(&self, key: &str, input: &CreateExpedition) -> Result<Value, StoreError> {
        self.inner.update(key, Self::payload(input)).await
    }

    /// POST `/expeditions/{key}/valider/`. Validation also touches
    /// invoicing state server-side, so the whole collection is re-fetched
    /// before resolving.
    pub async fn validate(&self, key: &str) -> Result<Value, StoreError> {
        self.inner
            .member_action_refetch(key, "valider", json!({}))
            .await
    }

    /// Shipments of one client, fetched without touching store state.
    pub async fn by_client(&self, client_id: i64) -> Result<Vec<Value>, StoreError> {
        self.inner
            .fetch_filtered(&[("code_client", &client_id.to_string())])
            .await
    }

    fn payload(input: &CreateExpedition) -> Payload {
        Payload::new()
            .set("poids", input.poids)
            .set("volume", input.volume)
            .set("statut", input.statut.unwrap_or_default().to_string())
            .set("clientId", input.client_id)
            .set_opt("tarification", input.tarification.as_deref())
            .set("description", input.description.as_deref().unwrap_or_default())
    }
}

impl std::ops::Deref for ExpeditionStore {
    type Target = ResourceStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statut_serializes_like_the_backend() {
        assert_eq!(ExpeditionStatut::EnAttente.to_string(), "EN_ATTENTE");
        assert_eq!(
            ExpeditionStatut::EnCoursLivraison.to_string(),
            "EN_COURS_LIVRAISON"
        );
        assert_eq!(
            serde_json::to_value(ExpeditionStatut::Livre).unwrap(),
            serde_json::json!("LIVRE")
        );
    }
}
