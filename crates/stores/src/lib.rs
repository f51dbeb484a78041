//! In-memory resource stores for the Sahara Express entities.
//!
//! Every entity follows the same shape: fetch the collection, normalize
//! it, keep it as the single in-memory list, recompute display statistics
//! from that list, and patch it from mutation responses. One generic
//! [`store::ResourceStore`] is parameterized by an
//! [`store::EntityDescriptor`] per entity; the modules under
//! [`entities`] supply the descriptors and the entity-specific
//! operations (validation, status changes, payment attachment, ...).

pub mod entities;
pub mod error;
pub mod stats;
pub mod store;

pub use entities::{
    ChauffeurStore, ClientStore, DestinationStore, ExpeditionStore, FactureStore, IncidentStore,
    PaiementStore, ReclamationStore, StoreSet, TarificationStore, TourneeStore, VehiculeStore,
};
pub use error::StoreError;
pub use stats::{compute_stats, Predicate, StatCategory, Stats};
pub use store::{DeleteTarget, EntityDescriptor, InsertOrder, LoadPhase, ResourceStore};
