//! Permission catalog — registration and lookup of permission
//! identifiers. Pure lookup/validation; no workflow.

use idgate_core::error::{IdgateError, IdgateResult};
use idgate_core::models::permission::Permission;
use idgate_core::repository::PermissionRepository;

use crate::error::AccessError;

/// Whether `id` is a well-formed permission token: dot-separated,
/// non-empty segments of `[A-Za-z0-9_-]` (e.g. `task.read`).
pub fn is_valid_token(id: &str) -> bool {
    !id.is_empty()
        && id.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        })
}

pub struct PermissionCatalog<P: PermissionRepository> {
    permissions: P,
}

impl<P: PermissionRepository> PermissionCatalog<P> {
    pub fn new(permissions: P) -> Self {
        Self { permissions }
    }

    /// Register a permission identifier. Fails on a malformed token or a
    /// duplicate id.
    pub async fn register(
        &self,
        id: &str,
        description: Option<String>,
    ) -> IdgateResult<Permission> {
        if !is_valid_token(id) {
            return Err(AccessError::Validation(format!(
                "'{id}' is not a valid permission token"
            ))
            .into());
        }
        self.permissions
            .create(Permission {
                id: id.to_string(),
                description,
            })
            .await
    }

    pub async fn get(&self, id: &str) -> IdgateResult<Permission> {
        self.permissions
            .find_by_id(id)
            .await?
            .ok_or_else(|| IdgateError::NotFound {
                entity: "permission".into(),
                id: id.to_string(),
            })
    }

    pub async fn list(&self) -> IdgateResult<Vec<Permission>> {
        self.permissions.list().await
    }
}
