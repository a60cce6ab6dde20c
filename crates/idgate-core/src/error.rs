//! Error types for the IDGATE system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdgateError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Invalid state: {reason}")]
    InvalidState { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type IdgateResult<T> = Result<T, IdgateError>;
