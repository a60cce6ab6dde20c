//! RBAC aggregation — role lifecycle, role-permission and user-role
//! bindings, and effective permission resolution.

use std::collections::HashSet;

use idgate_core::error::IdgateResult;
use idgate_core::models::role::Role;
use idgate_core::repository::{PermissionRepository, RoleRepository, UserRepository};
use uuid::Uuid;

use crate::error::AccessError;

/// RBAC service.
///
/// Binding semantics are deliberately asymmetric: adding an existing
/// binding is a no-op, removing a missing one is an error.
pub struct RbacService<R: RoleRepository, P: PermissionRepository, U: UserRepository> {
    roles: R,
    permissions: P,
    users: U,
}

impl<R: RoleRepository, P: PermissionRepository, U: UserRepository> RbacService<R, P, U> {
    pub fn new(roles: R, permissions: P, users: U) -> Self {
        Self {
            roles,
            permissions,
            users,
        }
    }

    /// Create a role. Names are unique, compared case-sensitively.
    pub async fn create_role(&self, name: &str) -> IdgateResult<Role> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AccessError::Validation("role name must be non-blank".into()).into());
        }
        if self.roles.find_by_name(name).await?.is_some() {
            return Err(AccessError::RoleAlreadyExists(name.to_string()).into());
        }
        self.roles.create(name.to_string()).await
    }

    /// Delete a role and everything bound to it.
    ///
    /// Cascade order is an invariant every storage backend must keep:
    /// permission grants first, then user assignments, then the role
    /// record, so no reader ever observes a binding referencing a deleted
    /// role.
    pub async fn delete_role(&self, role_id: Uuid) -> IdgateResult<()> {
        let role = self.roles.get_by_id(role_id).await?;

        let grants = self.permissions.clear_grants_for_role(role_id).await?;
        let assignments = self.roles.clear_assignments_for_role(role_id).await?;
        self.roles.delete(role_id).await?;

        tracing::info!(
            role_id = %role_id,
            role_name = %role.name,
            grants,
            assignments,
            "role deleted with cascaded bindings"
        );
        Ok(())
    }

    /// Grant a permission to a role. Idempotent.
    pub async fn grant_permission(&self, role_id: Uuid, permission_id: &str) -> IdgateResult<()> {
        self.roles.get_by_id(role_id).await?;
        if self.permissions.find_by_id(permission_id).await?.is_none() {
            return Err(AccessError::PermissionNotFound(permission_id.to_string()).into());
        }
        self.permissions
            .grant_to_role(role_id, permission_id.to_string())
            .await?;
        Ok(())
    }

    /// Revoke a permission from a role. Unlike grant, revoking a binding
    /// that does not exist is an error.
    pub async fn revoke_permission(&self, role_id: Uuid, permission_id: &str) -> IdgateResult<()> {
        self.roles.get_by_id(role_id).await?;
        let removed = self
            .permissions
            .revoke_from_role(role_id, permission_id)
            .await?;
        if !removed {
            return Err(AccessError::BindingNotFound(format!(
                "role {role_id} -> permission '{permission_id}'"
            ))
            .into());
        }
        Ok(())
    }

    /// Assign a role to a user. Idempotent.
    pub async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> IdgateResult<()> {
        self.users.get_by_id(user_id).await?;
        self.roles.get_by_id(role_id).await?;
        self.roles.assign_to_user(user_id, role_id).await?;
        Ok(())
    }

    /// Remove a role from a user. Errors if the assignment does not exist.
    pub async fn remove_role(&self, user_id: Uuid, role_id: Uuid) -> IdgateResult<()> {
        self.users.get_by_id(user_id).await?;
        self.roles.get_by_id(role_id).await?;
        let removed = self.roles.unassign_from_user(user_id, role_id).await?;
        if !removed {
            return Err(AccessError::BindingNotFound(format!(
                "user {user_id} -> role {role_id}"
            ))
            .into());
        }
        Ok(())
    }

    /// Compute the user's effective permission set: the deduplicated
    /// union of permissions over every assigned role. A user with no
    /// roles gets the empty set, not an error. Side-effect-free and safe
    /// to call concurrently.
    pub async fn resolve_permissions(&self, user_id: Uuid) -> IdgateResult<HashSet<String>> {
        let role_ids = self.roles.role_ids_for_user(user_id).await?;
        if role_ids.is_empty() {
            return Ok(HashSet::new());
        }
        self.permissions.permission_ids_for_roles(&role_ids).await
    }

    pub async fn roles_for(&self, user_id: Uuid) -> IdgateResult<Vec<Role>> {
        let role_ids = self.roles.role_ids_for_user(user_id).await?;
        let mut roles = Vec::with_capacity(role_ids.len());
        for role_id in role_ids {
            roles.push(self.roles.get_by_id(role_id).await?);
        }
        Ok(roles)
    }

    pub async fn list_roles(&self) -> IdgateResult<Vec<Role>> {
        self.roles.list().await
    }
}
