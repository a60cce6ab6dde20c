//! In-memory implementation of [`PreferencesRepository`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use idgate_core::error::{IdgateError, IdgateResult};
use idgate_core::models::preferences::UserPreferences;
use idgate_core::repository::PreferencesRepository;
use uuid::Uuid;

type Key = (Uuid, String);

#[derive(Clone, Default)]
pub struct MemoryPreferencesRepository {
    inner: Arc<RwLock<HashMap<Key, UserPreferences>>>,
}

impl MemoryPreferencesRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> IdgateResult<RwLockReadGuard<'_, HashMap<Key, UserPreferences>>> {
        self.inner
            .read()
            .map_err(|_| IdgateError::Storage("preferences store lock poisoned".into()))
    }

    fn write(&self) -> IdgateResult<RwLockWriteGuard<'_, HashMap<Key, UserPreferences>>> {
        self.inner
            .write()
            .map_err(|_| IdgateError::Storage("preferences store lock poisoned".into()))
    }
}

impl PreferencesRepository for MemoryPreferencesRepository {
    async fn upsert(
        &self,
        user_id: Uuid,
        namespace: String,
        data: serde_json::Value,
    ) -> IdgateResult<UserPreferences> {
        let mut records = self.write()?;
        let key = (user_id, namespace.clone());
        let record = match records.get(&key) {
            // Overwrite the document, keep the record identity.
            Some(existing) => UserPreferences {
                id: existing.id,
                user_id,
                namespace,
                data,
            },
            None => UserPreferences {
                id: Uuid::new_v4(),
                user_id,
                namespace,
                data,
            },
        };
        records.insert(key, record.clone());
        Ok(record)
    }

    async fn find(&self, user_id: Uuid, namespace: &str) -> IdgateResult<Option<UserPreferences>> {
        Ok(self
            .read()?
            .get(&(user_id, namespace.to_string()))
            .cloned())
    }
}
