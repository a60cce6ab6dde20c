//! Contact method registry.

use chrono::Utc;
use idgate_core::error::IdgateResult;
use idgate_core::models::contact::{ContactKind, ContactMethod};
use idgate_core::models::user::User;
use idgate_core::repository::{ContactMethodRepository, CreateContactMethod};
use uuid::Uuid;

use crate::error::AccessError;
use crate::notify::{Notifier, NoopNotifier};

/// Normalize an email address: trimmed and lowercased.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Normalize a contact value per kind. Phone numbers are trimmed only —
/// no E.164 canonicalization.
pub fn normalize_value(kind: ContactKind, value: &str) -> String {
    match kind {
        ContactKind::Email => normalize_email(value),
        ContactKind::Phone => value.trim().to_string(),
    }
}

/// Contact method service. The notifier is optional: when configured it
/// is invoked on every creation, verified or not.
pub struct ContactService<C: ContactMethodRepository, N: Notifier> {
    contacts: C,
    notifier: Option<N>,
}

impl<C: ContactMethodRepository> ContactService<C, NoopNotifier> {
    pub fn without_notifier(contacts: C) -> Self {
        Self {
            contacts,
            notifier: None,
        }
    }
}

impl<C: ContactMethodRepository, N: Notifier> ContactService<C, N> {
    pub fn new(contacts: C, notifier: Option<N>) -> Self {
        Self { contacts, notifier }
    }

    /// Record a contact method for a user.
    pub async fn add(
        &self,
        user: &User,
        kind: ContactKind,
        value: &str,
        verified: bool,
    ) -> IdgateResult<ContactMethod> {
        let value = normalize_value(kind, value);
        if value.is_empty() {
            return Err(AccessError::Validation("contact value must be non-blank".into()).into());
        }

        let contact = self
            .contacts
            .create(CreateContactMethod {
                user_id: user.id,
                kind,
                value,
                verified,
            })
            .await?;

        if let Some(notifier) = &self.notifier {
            if let Err(err) = notifier.contact_added(&contact, user).await {
                tracing::warn!(
                    error = %err,
                    contact_id = %contact.id,
                    "contact notification failed"
                );
            }
        }

        Ok(contact)
    }

    /// One-way verification transition. Re-verifying an already-verified
    /// contact is a no-op; nothing ever reverses it.
    pub async fn mark_verified(&self, contact_id: Uuid) -> IdgateResult<ContactMethod> {
        let mut contact = self.contacts.get_by_id(contact_id).await?;
        if contact.verified {
            return Ok(contact);
        }
        contact.verified = true;
        contact.verified_at = Some(Utc::now());
        self.contacts.save(contact).await
    }

    pub async fn list_for(&self, user_id: Uuid) -> IdgateResult<Vec<ContactMethod>> {
        self.contacts.list_by_user(user_id).await
    }

    /// Whether any user already has an EMAIL contact with this value
    /// (after normalization).
    pub async fn email_in_use(&self, value: &str) -> IdgateResult<bool> {
        self.contacts
            .email_value_exists(&normalize_email(value))
            .await
    }
}
