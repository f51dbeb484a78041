//! Generic per-entity resource store.
//!
//! Owns the single in-memory list of normalized records for one backend
//! resource, plus the loading phase and the derived statistics. All
//! mutations go through the [`Gateway`]; the list is only ever changed
//! from a successful backend response.
//!
//! Overlapping `fetch_all` calls are not deduplicated or
//! sequence-guarded: whichever response lands last wins. See DESIGN.md.

use std::sync::{Arc, RwLock};

use gateway::{extract_results, Gateway, UpdateVerb};
use normalize::{resolve_id, string_key, to_frontend, EntitySchema, Payload};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::{
    error::StoreError,
    stats::{compute_stats, StatCategory, Stats},
};

/// Where a freshly created record lands in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOrder {
    /// Newest first, the common case.
    Prepend,
    Append,
}

/// Loading lifecycle of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// Everything the generic store needs to know about one entity.
#[derive(Debug)]
pub struct EntityDescriptor {
    /// Resource segment under `/api/`.
    pub resource: &'static str,
    pub schema: &'static EntitySchema,
    pub stats: &'static [StatCategory],
    pub insert: InsertOrder,
    pub update_verb: UpdateVerb,
}

/// Delete accepts either a raw key or a full record; records resolve
/// their key from the schema's identifier candidates.
#[derive(Debug, Clone)]
pub enum DeleteTarget {
    Key(String),
    Record(Value),
}

impl From<&str> for DeleteTarget {
    fn from(key: &str) -> Self {
        DeleteTarget::Key(key.to_string())
    }
}

impl From<Value> for DeleteTarget {
    fn from(record: Value) -> Self {
        DeleteTarget::Record(record)
    }
}

#[derive(Debug, Default)]
struct StoreState {
    records: Vec<Value>,
    phase: LoadPhase,
    stats: Stats,
}

pub struct ResourceStore {
    gateway: Arc<dyn Gateway>,
    descriptor: &'static EntityDescriptor,
    state: RwLock<StoreState>,
}

impl ResourceStore {
    pub fn new(gateway: Arc<dyn Gateway>, descriptor: &'static EntityDescriptor) -> Self {
        let state = StoreState {
            stats: compute_stats(&[], descriptor.stats),
            ..StoreState::default()
        };
        Self {
            gateway,
            descriptor,
            state: RwLock::new(state),
        }
    }

    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.descriptor.schema
    }

    pub fn resource(&self) -> &'static str {
        self.descriptor.resource
    }

    /// Snapshot of the current normalized records.
    pub fn records(&self) -> Vec<Value> {
        self.read(|s| s.records.clone())
    }

    pub fn phase(&self) -> LoadPhase {
        self.read(|s| s.phase)
    }

    pub fn stats(&self) -> Stats {
        self.read(|s| s.stats.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.phase() == LoadPhase::Loading
    }

    /// Replace the list with the backend's collection. On failure the
    /// list resets to empty and the error is rethrown for the caller's
    /// notification.
    pub async fn fetch_all(&self) -> Result<Vec<Value>, StoreError> {
        self.write(|s| s.phase = LoadPhase::Loading);

        let raw = match self.gateway.list(self.descriptor.resource).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(entity = self.descriptor.resource, error = %e, "fetch failed");
                self.write(|s| {
                    s.records.clear();
                    s.stats = compute_stats(&s.records, self.descriptor.stats);
                    s.phase = LoadPhase::Error;
                });
                return Err(e.into());
            }
        };

        let records: Vec<Value> = extract_results(raw)
            .iter()
            .map(|item| to_frontend(item, self.descriptor.schema))
            .collect();
        info!(
            entity = self.descriptor.resource,
            count = records.len(),
            "collection fetched"
        );
        self.write(|s| {
            s.records = records.clone();
            s.stats = compute_stats(&s.records, self.descriptor.stats);
            s.phase = LoadPhase::Ready;
        });
        Ok(records)
    }

    /// Fetch a filtered collection without touching store state (per-client
    /// shipment or invoice lookups).
    pub async fn fetch_filtered(
        &self,
        query: &[(&str, &str)],
    ) -> Result<Vec<Value>, StoreError> {
        let raw = self
            .gateway
            .list_with(self.descriptor.resource, query)
            .await
            .inspect_err(
                |e| error!(entity = self.descriptor.resource, error = %e, "filtered fetch failed"),
            )?;
        Ok(extract_results(raw)
            .iter()
            .map(|item| to_frontend(item, self.descriptor.schema))
            .collect())
    }

    /// Create from an allow-listed payload and splice the normalized
    /// response into the list.
    pub async fn create(&self, payload: Payload) -> Result<Value, StoreError> {
        let body = payload.into_backend(self.descriptor.schema);
        let raw = self
            .gateway
            .create(self.descriptor.resource, &body)
            .await
            .inspect_err(
                |e| error!(entity = self.descriptor.resource, error = %e, "create failed"),
            )?;
        let record = to_frontend(&raw, self.descriptor.schema);
        self.write(|s| {
            match self.descriptor.insert {
                InsertOrder::Prepend => s.records.insert(0, record.clone()),
                InsertOrder::Append => s.records.push(record.clone()),
            }
            s.stats = compute_stats(&s.records, self.descriptor.stats);
        });
        Ok(record)
    }

    /// Update and replace the matching entry, matched by string-compared
    /// derived id so numeric backend keys still line up.
    pub async fn update(&self, key: &str, payload: Payload) -> Result<Value, StoreError> {
        let body = payload.into_backend(self.descriptor.schema);
        let raw = self
            .gateway
            .update(
                self.descriptor.resource,
                key,
                &body,
                self.descriptor.update_verb,
            )
            .await
            .inspect_err(
                |e| error!(entity = self.descriptor.resource, key, error = %e, "update failed"),
            )?;
        let record = to_frontend(&raw, self.descriptor.schema);
        self.replace_matching(key, record.clone());
        Ok(record)
    }

    /// PATCH a single field and splice the response in place.
    pub async fn patch_field(
        &self,
        key: &str,
        field: &str,
        value: Value,
    ) -> Result<Value, StoreError> {
        let body = Payload::new()
            .set(field, value)
            .into_backend(self.descriptor.schema);
        let raw = self
            .gateway
            .update(self.descriptor.resource, key, &body, UpdateVerb::Patch)
            .await
            .inspect_err(
                |e| error!(entity = self.descriptor.resource, key, error = %e, "patch failed"),
            )?;
        let record = to_frontend(&raw, self.descriptor.schema);
        self.replace_matching(key, record.clone());
        Ok(record)
    }

    /// Delete by key or by record. Records with no resolvable identifier
    /// fail before any network call. After the backend confirms, every
    /// entry whose any alias field matches the key (as a string) is
    /// removed.
    pub async fn delete(&self, target: impl Into<DeleteTarget>) -> Result<(), StoreError> {
        let key = match target.into() {
            DeleteTarget::Key(key) => key,
            DeleteTarget::Record(record) => {
                resolve_id(&record, self.descriptor.schema.id_candidates).ok_or_else(|| {
                    warn!(
                        entity = self.descriptor.resource,
                        "delete called without a usable identifier"
                    );
                    StoreError::MissingIdentifier {
                        entity: self.descriptor.resource,
                    }
                })?
            }
        };

        self.gateway
            .destroy(self.descriptor.resource, &key)
            .await
            .inspect_err(
                |e| error!(entity = self.descriptor.resource, key, error = %e, "delete failed"),
            )?;

        self.write(|s| {
            s.records.retain(|r| !self.matches_alias(r, &key));
            s.stats = compute_stats(&s.records, self.descriptor.stats);
        });
        Ok(())
    }

    /// Run a member action whose side effects span entities, then re-fetch
    /// the whole collection so the list reflects backend truth before the
    /// caller resolves.
    pub async fn member_action_refetch(
        &self,
        key: &str,
        action: &str,
        body: Value,
    ) -> Result<Value, StoreError> {
        let raw = self
            .gateway
            .member_action(self.descriptor.resource, key, action, &body)
            .await
            .inspect_err(|e| {
                error!(
                    entity = self.descriptor.resource,
                    key,
                    action,
                    error = %e,
                    "member action failed"
                )
            })?;
        let response = to_frontend(&raw, self.descriptor.schema);
        self.fetch_all().await?;
        Ok(response)
    }

    fn replace_matching(&self, key: &str, record: Value) {
        self.write(|s| {
            for existing in &mut s.records {
                let matches = resolve_id(existing, self.descriptor.schema.id_candidates)
                    .is_some_and(|id| id == key);
                if matches {
                    *existing = record.clone();
                }
            }
            s.stats = compute_stats(&s.records, self.descriptor.stats);
        });
    }

    fn matches_alias(&self, record: &Value, key: &str) -> bool {
        self.descriptor.schema.delete_aliases.iter().any(|alias| {
            record
                .get(*alias)
                .and_then(string_key)
                .is_some_and(|v| v == key)
        })
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        f(&state)
    }

    fn write(&self, f: impl FnOnce(&mut StoreState)) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        f(&mut state);
    }
}
