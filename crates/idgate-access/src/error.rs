//! Access-layer error types.

use idgate_core::error::IdgateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("role '{0}' already exists")]
    RoleAlreadyExists(String),

    #[error("permission '{0}' is not registered")]
    PermissionNotFound(String),

    #[error("binding {0} does not exist")]
    BindingNotFound(String),

    #[error("an account already exists for '{0}'")]
    UserAlreadyExists(String),

    #[error("invitation has expired")]
    InvitationExpired,

    #[error("invitation has already been accepted")]
    InvitationAlreadyAccepted,

    #[error("invitation has been revoked")]
    InvitationRevoked,

    #[error("claims email does not match the invited address")]
    EmailMismatch,

    #[error("email address is not verified")]
    EmailNotVerified,

    #[error("{0}")]
    Validation(String),
}

impl From<AccessError> for IdgateError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::RoleAlreadyExists(name) => IdgateError::AlreadyExists {
                entity: format!("role '{name}'"),
            },
            AccessError::UserAlreadyExists(email) => IdgateError::AlreadyExists {
                entity: format!("account for '{email}'"),
            },
            AccessError::PermissionNotFound(id) => IdgateError::NotFound {
                entity: "permission".into(),
                id,
            },
            AccessError::BindingNotFound(description) => IdgateError::NotFound {
                entity: "binding".into(),
                id: description,
            },
            AccessError::InvitationExpired
            | AccessError::InvitationAlreadyAccepted
            | AccessError::InvitationRevoked
            | AccessError::EmailMismatch
            | AccessError::EmailNotVerified => IdgateError::InvalidState {
                reason: err.to_string(),
            },
            AccessError::Validation(message) => IdgateError::Validation { message },
        }
    }
}
