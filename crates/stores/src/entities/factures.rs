//! Invoices ("factures"). Keyed by the `code_facture` business code, not
//! a numeric id; amounts arrive as decimal strings and are coerced to
//! numbers on the way in.

use std::sync::Arc;

use chrono::NaiveDate;
use gateway::{extract_results, Gateway, UpdateVerb};
use normalize::{to_frontend, BackendCasing, EntitySchema, FieldKind, FieldRule, Payload};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;
use ts_rs::TS;

use crate::{
    error::StoreError,
    stats::StatCategory,
    store::{EntityDescriptor, InsertOrder, ResourceStore},
};

use super::paiements;

pub static SCHEMA: EntitySchema = EntitySchema {
    entity: "factures",
    casing: BackendCasing::Snake,
    rules: &[
        FieldRule::both("code_facture", "codeFacture", FieldKind::Text),
        FieldRule::both("code_client", "clientId", FieldKind::Number),
        FieldRule::both("date_f", "dateF", FieldKind::Date),
        FieldRule::both("ht", "ht", FieldKind::Number),
        FieldRule::both("tva", "tva", FieldKind::Number),
        FieldRule::both("ttc", "ttc", FieldKind::Number),
        FieldRule::both("est_payee", "estPayee", FieldKind::Boolean),
        FieldRule::read_only("montant_paye", "montantPaye", FieldKind::Number),
        FieldRule::read_only("montant_restant", "montantRestant", FieldKind::Number),
        // Older serializer name for the same computed amount.
        FieldRule::read_only("reste_a_payer", "montantRestant", FieldKind::Number),
        FieldRule::read_only("client_nom", "clientNom", FieldKind::Text),
        FieldRule::read_only("client_prenom", "clientPrenom", FieldKind::Text),
        FieldRule::read_only("date_creation", "dateCreation", FieldKind::Date),
    ],
    id_candidates: &["codeFacture", "id"],
    delete_aliases: &["id", "codeFacture"],
};

const STATS: &[StatCategory] = &[
    StatCategory::total("total"),
    StatCategory::equals("payees", "estPayee", "true"),
    StatCategory::equals("impayees", "estPayee", "false"),
];

pub static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    resource: "factures",
    schema: &SCHEMA,
    stats: STATS,
    insert: InsertOrder::Prepend,
    update_verb: UpdateVerb::Put,
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateFacture {
    /// Left empty to let the backend generate the `FACT-xxxxx` code.
    pub code_facture: Option<String>,
    pub date_f: NaiveDate,
    pub ht: f64,
    pub tva: f64,
    pub ttc: f64,
    pub client_id: i64,
    pub remarques: Option<String>,
    pub est_payee: Option<bool>,
}

/// Payment attached to an invoice through
/// [`FactureStore::add_payment`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct AttachPaiement {
    pub date: NaiveDate,
    pub montant: f64,
    pub mode: String,
    pub reference: Option<String>,
    pub remarques: Option<String>,
}

pub struct FactureStore {
    inner: ResourceStore,
}

impl FactureStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            inner: ResourceStore::new(gateway, &DESCRIPTOR),
        }
    }

    pub async fn create(&self, input: &CreateFacture) -> Result<Value, StoreError> {
        self.inner.create(Self::payload(input)).await
    }

    pub async fn update(&self, key: &str, input: &CreateFacture) -> Result<Value, StoreError> {
        self.inner.update(key, Self::payload(input)).await
    }

    /// Server-side aggregates from `/factures/statistiques/`.
    pub async fn statistics(&self) -> Result<Value, StoreError> {
        Ok(self
            .inner
            .gateway()
            .collection_get("factures", "statistiques")
            .await?)
    }

    /// Unpaid invoices, normalized but not stored.
    pub async fn unpaid(&self) -> Result<Vec<Value>, StoreError> {
        let raw = self
            .inner
            .gateway()
            .collection_get("factures", "impayees")
            .await?;
        Ok(extract_results(raw)
            .iter()
            .map(|item| to_frontend(item, &SCHEMA))
            .collect())
    }

    /// Payments already recorded against one invoice.
    pub async fn payments_of(&self, code: &str) -> Result<Vec<Value>, StoreError> {
        let raw = self
            .inner
            .gateway()
            .collection_get("factures", &format!("{code}/paiements"))
            .await?;
        Ok(extract_results(raw)
            .iter()
            .map(|item| to_frontend(item, &paiements::SCHEMA))
            .collect())
    }

    /// POST `/factures/{code}/ajouter_expedition/` then re-fetch: the
    /// backend recomputes the invoice totals.
    pub async fn add_expedition(&self, code: &str, numexp: i64) -> Result<Value, StoreError> {
        self.inner
            .member_action_refetch(code, "ajouter_expedition", json!({ "numexp": numexp }))
            .await
    }

    /// Record a payment against an invoice. The payment is created on the
    /// paiements resource and the invoice collection is re-fetched so the
    /// paid/remaining amounts reflect backend truth.
    pub async fn add_payment(
        &self,
        code_facture: &str,
        input: &AttachPaiement,
    ) -> Result<Value, StoreError> {
        let body = Payload::new()
            .set("codeFacture", code_facture)
            .date("date", input.date)
            .set("montant", input.montant)
            .set("mode", input.mode.as_str())
            .set_opt("reference", input.reference.as_deref().filter(|r| !r.is_empty()))
            .set("remarques", input.remarques.as_deref().unwrap_or_default())
            .into_backend(&paiements::SCHEMA);
        let raw = self
            .inner
            .gateway()
            .create("paiements", &body)
            .await
            .inspect_err(|e| error!(code_facture, error = %e, "payment creation failed"))?;
        let paiement = to_frontend(&raw, &paiements::SCHEMA);
        self.inner.fetch_all().await?;
        Ok(paiement)
    }

    fn payload(input: &CreateFacture) -> Payload {
        Payload::new()
            .set_opt(
                "codeFacture",
                input.code_facture.as_deref().filter(|c| !c.is_empty()),
            )
            .date("dateF", input.date_f)
            .set("ht", input.ht)
            .set("tva", input.tva)
            .set("ttc", input.ttc)
            .set("clientId", input.client_id)
            .set("remarques", input.remarques.as_deref().unwrap_or_default())
            .set("estPayee", input.est_payee.unwrap_or(false))
    }
}

impl std::ops::Deref for FactureStore {
    type Target = ResourceStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
