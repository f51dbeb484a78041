//! Payments ("paiements").

use std::sync::Arc;

use chrono::NaiveDate;
use gateway::{extract_results, Gateway, UpdateVerb};
use normalize::{to_frontend, BackendCasing, EntitySchema, FieldKind, FieldRule, Payload};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::{
    error::StoreError,
    stats::StatCategory,
    store::{EntityDescriptor, InsertOrder, ResourceStore},
};

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "paiements",
    casing: BackendCasing::Snake,
    rules: &[
        FieldRule::both("montant_verse", "montant", FieldKind::Number),
        FieldRule::both("reference_p", "reference", FieldKind::Text),
        FieldRule::both("mode_paiement", "mode", FieldKind::Text),
        FieldRule::both("code_facture", "codeFacture", FieldKind::Text),
        FieldRule::read_only("mode_paiement_display", "modeDisplay", FieldKind::Text),
        FieldRule::read_only("code_facture_str", "codeFactureStr", FieldKind::Text),
        FieldRule::read_only("date_creation", "dateCreation", FieldKind::Date),
    ],
    id_candidates: &["id", "reference"],
    delete_aliases: &["id", "reference"],
};

const STATS: &[StatCategory] = &[StatCategory::total("total")];

pub static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    resource: "paiements",
    schema: &SCHEMA,
    stats: STATS,
    insert: InsertOrder::Prepend,
    update_verb: UpdateVerb::Put,
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreatePaiement {
    pub code_facture: String,
    pub date: NaiveDate,
    pub montant: f64,
    /// Payment mode code (`ESPECES`, `CHEQUE`, ...); the backend keeps
    /// the display label.
    pub mode: String,
    /// Left out to let the backend generate a `PAY-...` reference.
    pub reference: Option<String>,
    pub remarques: Option<String>,
}

pub struct PaiementStore {
    inner: ResourceStore,
}

impl PaiementStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            inner: ResourceStore::new(gateway, &DESCRIPTOR),
        }
    }

    pub async fn create(&self, input: &CreatePaiement) -> Result<Value, StoreError> {
        self.inner.create(Self::payload(input)).await
    }

    pub async fn update(&self, key: &str, input: &CreatePaiement) -> Result<Value, StoreError> {
        self.inner.update(key, Self::payload(input)).await
    }

    /// Server-side aggregates from `/paiements/statistiques/`.
    pub async fn statistics(&self) -> Result<Value, StoreError> {
        Ok(self
            .inner
            .gateway()
            .collection_get("paiements", "statistiques")
            .await?)
    }

    /// Payments of a single invoice, via the invoice's member endpoint.
    pub async fn for_facture(&self, code_facture: &str) -> Result<Vec<Value>, StoreError> {
        let raw = self
            .inner
            .gateway()
            .collection_get("factures", &format!("{code_facture}/paiements"))
            .await?;
        Ok(extract_results(raw)
            .iter()
            .map(|item| to_frontend(item, &SCHEMA))
            .collect())
    }

    fn payload(input: &CreatePaiement) -> Payload {
        Payload::new()
            .set("codeFacture", input.code_facture.as_str())
            .date("date", input.date)
            .set("montant", input.montant)
            .set("mode", input.mode.as_str())
            .set_opt(
                "reference",
                input.reference.as_deref().filter(|r| !r.trim().is_empty()),
            )
            .set("remarques", input.remarques.as_deref().unwrap_or_default())
    }
}

impl std::ops::Deref for PaiementStore {
    type Target = ResourceStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
