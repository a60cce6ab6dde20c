//! Contact method domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContactKind {
    Email,
    Phone,
}

/// A way to reach a user. Immutable after creation except for the
/// verification transition, which is one-way: unverified → verified,
/// never reversed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMethod {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: ContactKind,
    /// Normalized per kind: email lowercased and trimmed, phone trimmed.
    pub value: String,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
