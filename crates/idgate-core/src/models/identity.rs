//! External identity domain model.
//!
//! Links a verified federated identity — the `iss`/`sub` claim pair of an
//! upstream token — to an internal user. The (issuer, subject) pair maps to
//! at most one user at any time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalIdentity {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Identity provider identifier (the `iss` claim).
    pub issuer: String,
    /// Provider-local user identifier (the `sub` claim).
    pub subject: String,
}
