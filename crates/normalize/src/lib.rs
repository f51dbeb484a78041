//! Field-name normalization between the Sahara Express backend and the
//! frontend convention.
//!
//! The backend mixes snake_case (`code_client`, `montant_verse`),
//! PascalCase (`Nom`, `CodeClient`) and historical abbreviations
//! (`numexp`). The frontend speaks camelCase with a handful of semantic
//! renames per entity. One declarative [`EntitySchema`] per entity drives
//! a single generic converter in both directions.

pub mod convert;
pub mod key;
pub mod payload;
pub mod schema;

pub use convert::{resolve_id, string_key, to_backend, to_frontend};
pub use payload::Payload;
pub use schema::{BackendCasing, Direction, EntitySchema, FieldKind, FieldRule};
