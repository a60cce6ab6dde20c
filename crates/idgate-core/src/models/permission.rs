//! Permission domain model.

use serde::{Deserialize, Serialize};

/// A permission identifier with an optional human-readable description.
///
/// The id is the permission itself — a dotted string token such as
/// `task.read` — not a surrogate key. Existence in the catalog is a
/// precondition for granting the permission to any role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub description: Option<String>,
}
