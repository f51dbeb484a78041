//! Store behavior against an in-memory gateway: list normalization,
//! optimistic splices, delete key resolution, and failure handling.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use gateway::{ApiError, Gateway, UpdateVerb};
use serde_json::{json, Value};
use stores::{
    entities::{chauffeurs, clients, expeditions, factures},
    ChauffeurStore, ClientStore, ExpeditionStore, FactureStore, LoadPhase, StoreError,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[derive(Default)]
struct FakeGateway {
    calls: Mutex<Vec<String>>,
    list_body: Mutex<Value>,
    reply: Mutex<Value>,
    fail_list: AtomicBool,
}

impl FakeGateway {
    fn with_list(body: Value) -> Arc<Self> {
        let fake = Self::default();
        *fake.list_body.lock().unwrap() = body;
        Arc::new(fake)
    }

    fn set_list(&self, body: Value) {
        *self.list_body.lock().unwrap() = body;
    }

    fn set_reply(&self, body: Value) {
        *self.reply.lock().unwrap() = body;
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, entry: String) {
        self.calls.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn list(&self, resource: &str) -> Result<Value, ApiError> {
        self.log(format!("LIST {resource}"));
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(ApiError::Http {
                status: 500,
                body: "server error".to_string(),
            });
        }
        Ok(self.list_body.lock().unwrap().clone())
    }

    async fn list_with(&self, resource: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        self.log(format!("LIST {resource} ?{query:?}"));
        Ok(self.list_body.lock().unwrap().clone())
    }

    async fn retrieve(&self, resource: &str, key: &str) -> Result<Value, ApiError> {
        self.log(format!("GET {resource}/{key}"));
        Ok(self.reply.lock().unwrap().clone())
    }

    async fn create(&self, resource: &str, payload: &Value) -> Result<Value, ApiError> {
        self.log(format!("POST {resource} {payload}"));
        Ok(self.reply.lock().unwrap().clone())
    }

    async fn update(
        &self,
        resource: &str,
        key: &str,
        payload: &Value,
        verb: UpdateVerb,
    ) -> Result<Value, ApiError> {
        self.log(format!("{verb:?} {resource}/{key} {payload}"));
        Ok(self.reply.lock().unwrap().clone())
    }

    async fn destroy(&self, resource: &str, key: &str) -> Result<Value, ApiError> {
        self.log(format!("DELETE {resource}/{key}"));
        Ok(Value::Null)
    }

    async fn member_action(
        &self,
        resource: &str,
        key: &str,
        action: &str,
        body: &Value,
    ) -> Result<Value, ApiError> {
        self.log(format!("POST {resource}/{key}/{action} {body}"));
        Ok(self.reply.lock().unwrap().clone())
    }

    async fn collection_get(&self, resource: &str, path: &str) -> Result<Value, ApiError> {
        self.log(format!("GET {resource}/{path}"));
        Ok(self.reply.lock().unwrap().clone())
    }
}

#[tokio::test]
async fn bare_array_and_paginated_envelope_load_the_same() {
    let bare = FakeGateway::with_list(json!([
        { "CodeClient": 1, "Nom": "Dupont" },
        { "CodeClient": 2, "Nom": "Martin" }
    ]));
    let paginated = FakeGateway::with_list(json!({
        "count": 2,
        "next": null,
        "results": [
            { "CodeClient": 1, "Nom": "Dupont" },
            { "CodeClient": 2, "Nom": "Martin" }
        ]
    }));

    let a = ClientStore::new(bare.clone());
    let b = ClientStore::new(paginated.clone());
    a.fetch_all().await.unwrap();
    b.fetch_all().await.unwrap();

    assert_eq!(a.records(), b.records());
    assert_eq!(a.records().len(), 2);
    assert_eq!(a.phase(), LoadPhase::Ready);
    // PascalCase keys are normalized and the id derived from codeClient.
    assert_eq!(a.records()[0]["nom"], json!("Dupont"));
    assert_eq!(a.records()[0]["id"], json!(1));
}

#[tokio::test]
async fn create_sends_backend_keys_and_splices_once() {
    let fake = FakeGateway::with_list(json!([]));
    let store = ClientStore::new(fake.clone());
    store.fetch_all().await.unwrap();

    fake.set_reply(json!({ "CodeClient": 9, "Nom": "Benali", "Solde": "0.00" }));
    let input = clients::CreateClient {
        nom: "Benali".to_string(),
        prenom: "Yacine".to_string(),
        adresse: "12 rue des Oliviers".to_string(),
        tel: "0550123456".to_string(),
        email: "benali@example.com".to_string(),
        solde: None,
    };
    let created = store.create(&input).await.unwrap();

    assert_eq!(created["id"], json!(9));
    assert_eq!(created["solde"], json!(0.0));
    assert_eq!(store.records().len(), 1);
    assert_eq!(store.stats()["total"], 1);
    // Omitted optional fields never travel, and keys use backend casing.
    let post = fake
        .calls()
        .into_iter()
        .find(|c| c.starts_with("POST clients"))
        .unwrap();
    assert!(post.contains("\"Nom\""), "payload was {post}");
    assert!(!post.contains("Solde"), "payload was {post}");
}

#[tokio::test]
async fn new_expeditions_are_prepended_and_counted_by_status() {
    let fake = FakeGateway::with_list(json!([
        { "numexp": 1, "statut": "LIVRE", "code_client": 3 }
    ]));
    let store = ExpeditionStore::new(fake.clone());
    store.fetch_all().await.unwrap();

    fake.set_reply(json!({ "numexp": 2, "statut": "EN_ATTENTE", "code_client": 3 }));
    let input = expeditions::CreateExpedition {
        poids: 4.5,
        volume: 0.2,
        statut: None,
        client_id: 3,
        tarification: None,
        description: None,
    };
    store.create(&input).await.unwrap();

    let records = store.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["code"], json!(2), "newest record comes first");
    let stats = store.stats();
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["enAttente"], 1);
    assert_eq!(stats["livrees"], 1);
}

#[tokio::test]
async fn update_replaces_the_row_matched_by_string_id() {
    let fake = FakeGateway::with_list(json!([
        { "numexp": 12, "statut": "EN_ATTENTE", "code_client": 1, "poids": "3.00" },
        { "numexp": 13, "statut": "EN_ATTENTE", "code_client": 1, "poids": "1.00" }
    ]));
    let store = ExpeditionStore::new(fake.clone());
    store.fetch_all().await.unwrap();

    fake.set_reply(json!({ "numexp": 12, "statut": "EN_ATTENTE", "code_client": 1, "poids": "8.00" }));
    let input = expeditions::CreateExpedition {
        poids: 8.0,
        volume: 0.5,
        statut: Some(expeditions::ExpeditionStatut::EnAttente),
        client_id: 1,
        tarification: None,
        description: None,
    };
    // Numeric backend key, string key from the caller.
    store.update("12", &input).await.unwrap();

    let records = store.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["poids"], json!(8.0));
    assert_eq!(records[1]["poids"], json!(1.0));
}

#[tokio::test]
async fn created_invoice_counts_as_unpaid_until_flagged() {
    let fake = FakeGateway::with_list(json!([]));
    let store = FactureStore::new(fake.clone());
    store.fetch_all().await.unwrap();
    assert_eq!(store.stats()["impayees"], 0);

    fake.set_reply(json!({
        "code_facture": "FACT-1",
        "date_f": "2026-08-20",
        "ttc": "2400.00",
        "est_payee": false
    }));
    let input = factures::CreateFacture {
        code_facture: None,
        date_f: chrono::NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
        ht: 2000.0,
        tva: 400.0,
        ttc: 2400.0,
        client_id: 1,
        remarques: None,
        est_payee: None,
    };
    let created = store.create(&input).await.unwrap();

    assert_eq!(created["dateF"], json!("2026-08-20"));
    assert_eq!(store.records().len(), 1);
    let stats = store.stats();
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["impayees"], 1);
    assert_eq!(stats["payees"], 0);
}

#[tokio::test]
async fn delete_by_record_resolves_the_first_usable_key() {
    let fake = FakeGateway::with_list(json!([
        { "code_facture": "FACT-7", "ttc": "100.00" },
        { "code_facture": "FACT-8", "ttc": "50.00" }
    ]));
    let store = FactureStore::new(fake.clone());
    store.fetch_all().await.unwrap();

    store
        .delete(json!({ "id": null, "codeFacture": "FACT-7" }))
        .await
        .unwrap();

    assert!(fake.calls().contains(&"DELETE factures/FACT-7".to_string()));
    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["codeFacture"], json!("FACT-8"));
    assert_eq!(store.stats()["total"], 1);
}

#[tokio::test]
async fn delete_without_identifier_fails_before_any_request() {
    let fake = FakeGateway::with_list(json!([]));
    let store = FactureStore::new(fake.clone());

    let err = store.delete(json!({ "ttc": 100 })).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::MissingIdentifier { entity: "factures" }
    ));
    assert!(fake.calls().is_empty(), "no network call expected");
}

#[tokio::test]
async fn failed_fetch_empties_the_list_and_flags_the_store() {
    init_tracing();
    let fake = FakeGateway::with_list(json!([
        { "CodeClient": 1, "Nom": "Dupont" }
    ]));
    let store = ClientStore::new(fake.clone());
    store.fetch_all().await.unwrap();
    assert_eq!(store.records().len(), 1);

    fake.fail_list.store(true, Ordering::SeqCst);
    let err = store.fetch_all().await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Api(ApiError::Http { status: 500, .. })
    ));
    assert!(store.records().is_empty());
    assert_eq!(store.phase(), LoadPhase::Error);
    assert_eq!(store.stats()["total"], 0);
}

#[tokio::test]
async fn validating_a_shipment_refetches_the_collection() {
    init_tracing();
    let fake = FakeGateway::with_list(json!([
        { "numexp": 5, "statut": "EN_ATTENTE", "code_client": 2 }
    ]));
    let store = ExpeditionStore::new(fake.clone());
    store.fetch_all().await.unwrap();

    fake.set_reply(json!({ "numexp": 5, "statut": "EN_PREPARATION", "code_client": 2 }));
    fake.set_list(json!([
        { "numexp": 5, "statut": "EN_PREPARATION", "code_client": 2 }
    ]));
    store.validate("5").await.unwrap();

    let calls = fake.calls();
    let action = calls
        .iter()
        .position(|c| c.starts_with("POST expeditions/5/valider"))
        .unwrap();
    let refetch = calls.iter().rposition(|c| c == "LIST expeditions").unwrap();
    assert!(refetch > action, "re-fetch must follow the action");
    assert_eq!(store.records()[0]["statut"], json!("EN_PREPARATION"));
    assert_eq!(store.stats()["enPreparation"], 1);
}

#[tokio::test]
async fn availability_toggle_patches_the_backend_field_name() {
    let fake = FakeGateway::with_list(json!([
        { "code_chauffeur": "CH-3", "nom": "Aissa", "statut_dispo": true }
    ]));
    let store = ChauffeurStore::new(fake.clone());
    store.fetch_all().await.unwrap();
    assert_eq!(store.stats()["disponibles"], 1);

    fake.set_reply(json!({ "code_chauffeur": "CH-3", "nom": "Aissa", "statut_dispo": false }));
    store.set_availability("CH-3", false).await.unwrap();

    let patch = fake
        .calls()
        .into_iter()
        .find(|c| c.starts_with("Patch chauffeurs/CH-3"))
        .unwrap();
    assert!(patch.contains("\"statut_dispo\":false"), "payload was {patch}");
    let stats = store.stats();
    assert_eq!(stats["disponibles"], 0);
    assert_eq!(stats["enMission"], 1);
}

#[tokio::test]
async fn filtered_fetch_leaves_store_state_alone() {
    let fake = FakeGateway::with_list(json!([
        { "numexp": 1, "statut": "LIVRE", "code_client": 4 }
    ]));
    let store = ExpeditionStore::new(fake.clone());

    let rows = store.by_client(4).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["clientId"], json!(4));
    assert!(store.records().is_empty());
    assert_eq!(store.phase(), LoadPhase::Idle);
}

#[tokio::test]
async fn schemas_expose_consistent_delete_aliases() {
    // Every alias a delete can match on must also be an id candidate
    // source or the literal injected id.
    for schema in [
        &clients::SCHEMA,
        &expeditions::SCHEMA,
        &factures::SCHEMA,
        &chauffeurs::SCHEMA,
    ] {
        assert!(schema.delete_aliases.contains(&"id"), "{}", schema.entity);
        assert!(!schema.id_candidates.is_empty(), "{}", schema.entity);
    }
}
