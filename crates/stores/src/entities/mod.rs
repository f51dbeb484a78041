//! One module per backend resource: its normalization schema, statistic
//! categories, descriptor for the generic store, and the entity-specific
//! operations.

use std::sync::Arc;

use gateway::Gateway;
use normalize::string_key;
use serde_json::Value;

pub mod chauffeurs;
pub mod clients;
pub mod destinations;
pub mod expeditions;
pub mod factures;
pub mod incidents;
pub mod paiements;
pub mod reclamations;
pub mod tarifications;
pub mod tournees;
pub mod vehicules;

pub use chauffeurs::ChauffeurStore;
pub use clients::ClientStore;
pub use destinations::DestinationStore;
pub use expeditions::ExpeditionStore;
pub use factures::FactureStore;
pub use incidents::IncidentStore;
pub use paiements::PaiementStore;
pub use reclamations::ReclamationStore;
pub use tarifications::TarificationStore;
pub use tournees::TourneeStore;
pub use vehicules::VehiculeStore;

/// Generate the next `{prefix}N` business code from the codes already in
/// the list (destinations use `Des-N`, tarifications `Tar-N`, ...). The
/// backend accepts client-supplied primary keys for these resources.
pub(crate) fn next_code(records: &[Value], field: &str, prefix: &str) -> String {
    let max = records
        .iter()
        .filter_map(|r| r.get(field).and_then(string_key))
        .filter_map(|code| {
            code.strip_prefix(prefix)
                .and_then(|n| n.parse::<u64>().ok())
        })
        .max()
        .unwrap_or(0);
    format!("{prefix}{}", max + 1)
}

/// Every store in the application, sharing one gateway.
pub struct StoreSet {
    pub clients: ClientStore,
    pub expeditions: ExpeditionStore,
    pub factures: FactureStore,
    pub paiements: PaiementStore,
    pub reclamations: ReclamationStore,
    pub incidents: IncidentStore,
    pub chauffeurs: ChauffeurStore,
    pub vehicules: VehiculeStore,
    pub tournees: TourneeStore,
    pub destinations: DestinationStore,
    pub tarifications: TarificationStore,
}

impl StoreSet {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            clients: ClientStore::new(gateway.clone()),
            expeditions: ExpeditionStore::new(gateway.clone()),
            factures: FactureStore::new(gateway.clone()),
            paiements: PaiementStore::new(gateway.clone()),
            reclamations: ReclamationStore::new(gateway.clone()),
            incidents: IncidentStore::new(gateway.clone()),
            chauffeurs: ChauffeurStore::new(gateway.clone()),
            vehicules: VehiculeStore::new(gateway.clone()),
            tournees: TourneeStore::new(gateway.clone()),
            destinations: DestinationStore::new(gateway.clone()),
            tarifications: TarificationStore::new(gateway),
        }
    }
}
