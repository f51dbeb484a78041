//! Store-boundary errors. Everything is logged where it happens and
//! rethrown so presentation code can show a notification; nothing is
//! retried.

use gateway::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),
    /// Delete was called with a record carrying no usable key. Raised
    /// before any network call.
    #[error("could not resolve an identifier for {entity}")]
    MissingIdentifier { entity: &'static str },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
