//! IDGATE Core — domain models, repository traits, and error types.
//!
//! This crate carries no storage or service logic; the service layer
//! (`idgate-access`) is generic over the repository traits defined here,
//! and any storage backend (in-memory, embedded, remote) implements them.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{IdgateError, IdgateResult};
