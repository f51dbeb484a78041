//! Declarative per-entity normalization schemas.

use crate::key::normalize_key;

/// Declared value type of a field. `Number` fields get string-to-number
/// coercion on the way in; `Date` fields are sent as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Date,
}

/// Which direction a rename applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Renamed on fetch and on send.
    Both,
    /// Read-only serializer field: renamed on fetch, dropped from
    /// outgoing payloads (`statut_display`, `peut_etre_modifie`, ...).
    FrontendOnly,
}

/// One semantic rename with its declared type.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub backend: &'static str,
    pub frontend: &'static str,
    pub kind: FieldKind,
    pub direction: Direction,
}

impl FieldRule {
    pub const fn both(backend: &'static str, frontend: &'static str, kind: FieldKind) -> Self {
        Self {
            backend,
            frontend,
            kind,
            direction: Direction::Both,
        }
    }

    pub const fn read_only(backend: &'static str, frontend: &'static str, kind: FieldKind) -> Self {
        Self {
            backend,
            frontend,
            kind,
            direction: Direction::FrontendOnly,
        }
    }
}

/// Default casing for keys the rule table does not cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCasing {
    /// camelCase -> snake_case (logistics resources).
    Snake,
    /// first letter uppercased (clients, reclamations).
    Pascal,
    /// sent as-is.
    Preserve,
}

/// Normalization contract for one backend resource.
#[derive(Debug)]
pub struct EntitySchema {
    pub entity: &'static str,
    pub casing: BackendCasing,
    pub rules: &'static [FieldRule],
    /// Priority-ordered frontend keys from which the derived `id` is taken.
    pub id_candidates: &'static [&'static str],
    /// Every field compared (as strings) when removing a deleted record.
    pub delete_aliases: &'static [&'static str],
}

impl EntitySchema {
    /// Rule matching a key that already went through generic conversion.
    /// Matches on the camelCased backend name or on the frontend name, so
    /// re-normalizing an already-normalized record hits the same rule.
    pub fn rule_for_normalized(&self, key: &str) -> Option<&FieldRule> {
        self.rules
            .iter()
            .find(|r| r.frontend == key || normalize_key(r.backend) == key)
    }

    /// Rule matching an outgoing frontend key.
    pub fn rule_for_frontend(&self, key: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.frontend == key)
    }
}
