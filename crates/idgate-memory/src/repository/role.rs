//! In-memory implementation of [`RoleRepository`].

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use idgate_core::error::{IdgateError, IdgateResult};
use idgate_core::models::role::Role;
use idgate_core::repository::RoleRepository;
use uuid::Uuid;

#[derive(Default)]
struct RoleStore {
    roles: HashMap<Uuid, Role>,
    /// (user_id, role_id) assignment edges.
    assignments: HashSet<(Uuid, Uuid)>,
}

#[derive(Clone, Default)]
pub struct MemoryRoleRepository {
    inner: Arc<RwLock<RoleStore>>,
}

impl MemoryRoleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> IdgateResult<RwLockReadGuard<'_, RoleStore>> {
        self.inner
            .read()
            .map_err(|_| IdgateError::Storage("role store lock poisoned".into()))
    }

    fn write(&self) -> IdgateResult<RwLockWriteGuard<'_, RoleStore>> {
        self.inner
            .write()
            .map_err(|_| IdgateError::Storage("role store lock poisoned".into()))
    }
}

impl RoleRepository for MemoryRoleRepository {
    async fn create(&self, name: String) -> IdgateResult<Role> {
        let role = Role {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
        };
        self.write()?.roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn get_by_id(&self, id: Uuid) -> IdgateResult<Role> {
        self.read()?
            .roles
            .get(&id)
            .cloned()
            .ok_or_else(|| IdgateError::NotFound {
                entity: "role".into(),
                id: id.to_string(),
            })
    }

    async fn find_by_name(&self, name: &str) -> IdgateResult<Option<Role>> {
        Ok(self
            .read()?
            .roles
            .values()
            .find(|role| role.name == name)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> IdgateResult<()> {
        self.write()?
            .roles
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| IdgateError::NotFound {
                entity: "role".into(),
                id: id.to_string(),
            })
    }

    async fn list(&self) -> IdgateResult<Vec<Role>> {
        let mut roles: Vec<Role> = self.read()?.roles.values().cloned().collect();
        roles.sort_by_key(|role| (role.created_at, role.id));
        Ok(roles)
    }

    async fn assign_to_user(&self, user_id: Uuid, role_id: Uuid) -> IdgateResult<bool> {
        Ok(self.write()?.assignments.insert((user_id, role_id)))
    }

    async fn unassign_from_user(&self, user_id: Uuid, role_id: Uuid) -> IdgateResult<bool> {
        Ok(self.write()?.assignments.remove(&(user_id, role_id)))
    }

    async fn role_ids_for_user(&self, user_id: Uuid) -> IdgateResult<Vec<Uuid>> {
        let mut role_ids: Vec<Uuid> = self
            .read()?
            .assignments
            .iter()
            .filter(|(assigned_user, _)| *assigned_user == user_id)
            .map(|(_, role_id)| *role_id)
            .collect();
        role_ids.sort();
        Ok(role_ids)
    }

    async fn clear_assignments_for_role(&self, role_id: Uuid) -> IdgateResult<u64> {
        let mut store = self.write()?;
        let before = store.assignments.len();
        store
            .assignments
            .retain(|(_, assigned_role)| *assigned_role != role_id);
        Ok((before - store.assignments.len()) as u64)
    }
}
