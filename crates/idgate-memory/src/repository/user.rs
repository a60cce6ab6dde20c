//! In-memory implementation of [`UserRepository`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use idgate_core::error::{IdgateError, IdgateResult};
use idgate_core::models::user::{User, UserStatus};
use idgate_core::repository::UserRepository;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MemoryUserRepository {
    inner: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> IdgateResult<RwLockReadGuard<'_, HashMap<Uuid, User>>> {
        self.inner
            .read()
            .map_err(|_| IdgateError::Storage("user store lock poisoned".into()))
    }

    fn write(&self) -> IdgateResult<RwLockWriteGuard<'_, HashMap<Uuid, User>>> {
        self.inner
            .write()
            .map_err(|_| IdgateError::Storage("user store lock poisoned".into()))
    }
}

impl UserRepository for MemoryUserRepository {
    async fn create(&self, status: UserStatus) -> IdgateResult<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            status,
            created_at: now,
            updated_at: now,
        };
        self.write()?.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> IdgateResult<User> {
        self.read()?
            .get(&id)
            .cloned()
            .ok_or_else(|| IdgateError::NotFound {
                entity: "user".into(),
                id: id.to_string(),
            })
    }

    async fn set_status(&self, id: Uuid, status: UserStatus) -> IdgateResult<User> {
        let mut users = self.write()?;
        let user = users.get_mut(&id).ok_or_else(|| IdgateError::NotFound {
            entity: "user".into(),
            id: id.to_string(),
        })?;
        user.status = status;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn list(&self) -> IdgateResult<Vec<User>> {
        let mut users: Vec<User> = self.read()?.values().cloned().collect();
        users.sort_by_key(|user| (user.created_at, user.id));
        Ok(users)
    }
}
