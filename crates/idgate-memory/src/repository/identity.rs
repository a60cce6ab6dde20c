//! In-memory implementation of [`ExternalIdentityRepository`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use idgate_core::error::{IdgateError, IdgateResult};
use idgate_core::models::identity::ExternalIdentity;
use idgate_core::repository::ExternalIdentityRepository;
use uuid::Uuid;

type Key = (String, String);

#[derive(Clone, Default)]
pub struct MemoryExternalIdentityRepository {
    inner: Arc<RwLock<HashMap<Key, ExternalIdentity>>>,
}

impl MemoryExternalIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> IdgateResult<RwLockReadGuard<'_, HashMap<Key, ExternalIdentity>>> {
        self.inner
            .read()
            .map_err(|_| IdgateError::Storage("identity store lock poisoned".into()))
    }

    fn write(&self) -> IdgateResult<RwLockWriteGuard<'_, HashMap<Key, ExternalIdentity>>> {
        self.inner
            .write()
            .map_err(|_| IdgateError::Storage("identity store lock poisoned".into()))
    }
}

impl ExternalIdentityRepository for MemoryExternalIdentityRepository {
    async fn link(
        &self,
        user_id: Uuid,
        issuer: String,
        subject: String,
    ) -> IdgateResult<ExternalIdentity> {
        // Check-and-insert under one write lock — the uniqueness check is
        // atomic with respect to concurrent links of the same pair.
        let mut identities = self.write()?;
        let key = (issuer.clone(), subject.clone());
        if identities.contains_key(&key) {
            return Err(IdgateError::AlreadyExists {
                entity: format!("external identity ({issuer}, {subject})"),
            });
        }
        let identity = ExternalIdentity {
            id: Uuid::new_v4(),
            user_id,
            issuer,
            subject,
        };
        identities.insert(key, identity.clone());
        Ok(identity)
    }

    async fn find_by_issuer_subject(
        &self,
        issuer: &str,
        subject: &str,
    ) -> IdgateResult<Option<ExternalIdentity>> {
        Ok(self
            .read()?
            .get(&(issuer.to_string(), subject.to_string()))
            .cloned())
    }

    async fn unlink(&self, issuer: &str, subject: &str) -> IdgateResult<()> {
        self.write()?
            .remove(&(issuer.to_string(), subject.to_string()))
            .map(|_| ())
            .ok_or_else(|| IdgateError::NotFound {
                entity: "external identity".into(),
                id: format!("({issuer}, {subject})"),
            })
    }

    async fn list_by_user(&self, user_id: Uuid) -> IdgateResult<Vec<ExternalIdentity>> {
        let mut identities: Vec<ExternalIdentity> = self
            .read()?
            .values()
            .filter(|identity| identity.user_id == user_id)
            .cloned()
            .collect();
        identities.sort_by(|a, b| (&a.issuer, &a.subject).cmp(&(&b.issuer, &b.subject)));
        Ok(identities)
    }
}
