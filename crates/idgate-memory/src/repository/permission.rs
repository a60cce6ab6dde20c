//! In-memory implementation of [`PermissionRepository`].

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use idgate_core::error::{IdgateError, IdgateResult};
use idgate_core::models::permission::Permission;
use idgate_core::repository::PermissionRepository;
use uuid::Uuid;

#[derive(Default)]
struct PermissionStore {
    permissions: HashMap<String, Permission>,
    /// (role_id, permission_id) grant edges.
    grants: HashSet<(Uuid, String)>,
}

#[derive(Clone, Default)]
pub struct MemoryPermissionRepository {
    inner: Arc<RwLock<PermissionStore>>,
}

impl MemoryPermissionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> IdgateResult<RwLockReadGuard<'_, PermissionStore>> {
        self.inner
            .read()
            .map_err(|_| IdgateError::Storage("permission store lock poisoned".into()))
    }

    fn write(&self) -> IdgateResult<RwLockWriteGuard<'_, PermissionStore>> {
        self.inner
            .write()
            .map_err(|_| IdgateError::Storage("permission store lock poisoned".into()))
    }
}

impl PermissionRepository for MemoryPermissionRepository {
    async fn create(&self, permission: Permission) -> IdgateResult<Permission> {
        let mut store = self.write()?;
        if store.permissions.contains_key(&permission.id) {
            return Err(IdgateError::AlreadyExists {
                entity: format!("permission '{}'", permission.id),
            });
        }
        store
            .permissions
            .insert(permission.id.clone(), permission.clone());
        Ok(permission)
    }

    async fn find_by_id(&self, id: &str) -> IdgateResult<Option<Permission>> {
        Ok(self.read()?.permissions.get(id).cloned())
    }

    async fn list(&self) -> IdgateResult<Vec<Permission>> {
        let mut permissions: Vec<Permission> =
            self.read()?.permissions.values().cloned().collect();
        permissions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(permissions)
    }

    async fn grant_to_role(&self, role_id: Uuid, permission_id: String) -> IdgateResult<bool> {
        Ok(self.write()?.grants.insert((role_id, permission_id)))
    }

    async fn revoke_from_role(&self, role_id: Uuid, permission_id: &str) -> IdgateResult<bool> {
        Ok(self
            .write()?
            .grants
            .remove(&(role_id, permission_id.to_string())))
    }

    async fn permission_ids_for_roles(&self, role_ids: &[Uuid]) -> IdgateResult<HashSet<String>> {
        Ok(self
            .read()?
            .grants
            .iter()
            .filter(|(role_id, _)| role_ids.contains(role_id))
            .map(|(_, permission_id)| permission_id.clone())
            .collect())
    }

    async fn clear_grants_for_role(&self, role_id: Uuid) -> IdgateResult<u64> {
        let mut store = self.write()?;
        let before = store.grants.len();
        store.grants.retain(|(granted_role, _)| *granted_role != role_id);
        Ok((before - store.grants.len()) as u64)
    }
}
