//! HTTP gateway to the Sahara Express REST backend.
//!
//! One method per REST operation per resource, behind the [`Gateway`]
//! trait so stores can be exercised against an in-memory fake. The real
//! client attaches a bearer token to every request and transparently
//! retries once after refreshing an expired access token.

pub mod auth;
pub mod client;
pub mod error;
pub mod response;
pub mod session;

pub use client::{ApiClient, Gateway, UpdateVerb};
pub use error::ApiError;
pub use response::extract_results;
pub use session::{MemorySession, SessionStore, UserProfile};
