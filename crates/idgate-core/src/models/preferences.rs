//! User preferences domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One preference document per (user, namespace) key.
///
/// `data` is an opaque structured document; updates overwrite the whole
/// record rather than appending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    pub id: Uuid,
    pub user_id: Uuid,
    pub namespace: String,
    pub data: serde_json::Value,
}
