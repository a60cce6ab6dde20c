//! In-memory implementation of [`ContactMethodRepository`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use idgate_core::error::{IdgateError, IdgateResult};
use idgate_core::models::contact::{ContactKind, ContactMethod};
use idgate_core::repository::{ContactMethodRepository, CreateContactMethod};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MemoryContactMethodRepository {
    inner: Arc<RwLock<HashMap<Uuid, ContactMethod>>>,
}

impl MemoryContactMethodRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> IdgateResult<RwLockReadGuard<'_, HashMap<Uuid, ContactMethod>>> {
        self.inner
            .read()
            .map_err(|_| IdgateError::Storage("contact store lock poisoned".into()))
    }

    fn write(&self) -> IdgateResult<RwLockWriteGuard<'_, HashMap<Uuid, ContactMethod>>> {
        self.inner
            .write()
            .map_err(|_| IdgateError::Storage("contact store lock poisoned".into()))
    }
}

impl ContactMethodRepository for MemoryContactMethodRepository {
    async fn create(&self, input: CreateContactMethod) -> IdgateResult<ContactMethod> {
        let now = Utc::now();
        let contact = ContactMethod {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            kind: input.kind,
            value: input.value,
            verified: input.verified,
            verified_at: input.verified.then_some(now),
            created_at: now,
        };
        self.write()?.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn get_by_id(&self, id: Uuid) -> IdgateResult<ContactMethod> {
        self.read()?
            .get(&id)
            .cloned()
            .ok_or_else(|| IdgateError::NotFound {
                entity: "contact method".into(),
                id: id.to_string(),
            })
    }

    async fn email_value_exists(&self, value: &str) -> IdgateResult<bool> {
        Ok(self
            .read()?
            .values()
            .any(|contact| contact.kind == ContactKind::Email && contact.value == value))
    }

    async fn save(&self, contact: ContactMethod) -> IdgateResult<ContactMethod> {
        self.write()?.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn list_by_user(&self, user_id: Uuid) -> IdgateResult<Vec<ContactMethod>> {
        let mut contacts: Vec<ContactMethod> = self
            .read()?
            .values()
            .filter(|contact| contact.user_id == user_id)
            .cloned()
            .collect();
        contacts.sort_by_key(|contact| (contact.created_at, contact.id));
        Ok(contacts)
    }
}
