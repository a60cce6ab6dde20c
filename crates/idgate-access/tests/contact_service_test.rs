//! Integration tests for the contact method registry.

use std::sync::{Arc, Mutex};

use idgate_access::contact::ContactService;
use idgate_access::notify::Notifier;
use idgate_core::error::{IdgateError, IdgateResult};
use idgate_core::models::contact::{ContactKind, ContactMethod};
use idgate_core::models::invitation::Invitation;
use idgate_core::models::user::{User, UserStatus};
use idgate_core::repository::UserRepository;
use idgate_memory::{MemoryContactMethodRepository, MemoryUserRepository};
use uuid::Uuid;

#[derive(Clone, Default)]
struct RecordingNotifier {
    contact_events: Arc<Mutex<Vec<String>>>,
}

impl Notifier for RecordingNotifier {
    async fn invitation_created(&self, _invitation: &Invitation) -> IdgateResult<()> {
        Ok(())
    }

    async fn contact_added(&self, contact: &ContactMethod, _user: &User) -> IdgateResult<()> {
        self.contact_events
            .lock()
            .unwrap()
            .push(contact.value.clone());
        Ok(())
    }
}

async fn setup() -> (
    ContactService<MemoryContactMethodRepository, RecordingNotifier>,
    User,
    Arc<Mutex<Vec<String>>>,
) {
    let users = MemoryUserRepository::new();
    let user = users.create(UserStatus::Active).await.unwrap();
    let notifier = RecordingNotifier::default();
    let events = notifier.contact_events.clone();
    let svc = ContactService::new(MemoryContactMethodRepository::new(), Some(notifier));
    (svc, user, events)
}

#[tokio::test]
async fn add_normalizes_and_notifies() {
    let (svc, user, events) = setup().await;

    let email = svc
        .add(&user, ContactKind::Email, " Bob@Example.COM ", false)
        .await
        .unwrap();
    assert_eq!(email.value, "bob@example.com");
    assert!(!email.verified);

    let phone = svc
        .add(&user, ContactKind::Phone, " +1 555 0100 ", false)
        .await
        .unwrap();
    assert_eq!(phone.value, "+1 555 0100");

    assert_eq!(
        events.lock().unwrap().as_slice(),
        ["bob@example.com", "+1 555 0100"]
    );
}

#[tokio::test]
async fn add_blank_value_fails() {
    let (svc, user, _) = setup().await;

    let err = svc
        .add(&user, ContactKind::Email, "   ", false)
        .await
        .unwrap_err();
    assert!(matches!(err, IdgateError::Validation { .. }));
}

#[tokio::test]
async fn verification_is_one_way_and_idempotent() {
    let (svc, user, _) = setup().await;

    let contact = svc
        .add(&user, ContactKind::Email, "bob@example.com", false)
        .await
        .unwrap();
    assert!(contact.verified_at.is_none());

    let verified = svc.mark_verified(contact.id).await.unwrap();
    assert!(verified.verified);
    let first_verified_at = verified.verified_at.unwrap();

    // Re-verifying changes nothing.
    let again = svc.mark_verified(contact.id).await.unwrap();
    assert_eq!(again.verified_at.unwrap(), first_verified_at);
}

#[tokio::test]
async fn mark_verified_unknown_contact_fails() {
    let (svc, _, _) = setup().await;

    let err = svc.mark_verified(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, IdgateError::NotFound { .. }));
}

#[tokio::test]
async fn email_in_use_matches_normalized_value() {
    let (svc, user, _) = setup().await;

    svc.add(&user, ContactKind::Email, "bob@example.com", true)
        .await
        .unwrap();

    assert!(svc.email_in_use("  BOB@example.com ").await.unwrap());
    assert!(!svc.email_in_use("alice@example.com").await.unwrap());

    // Phone values never collide with email lookups.
    svc.add(&user, ContactKind::Phone, "555", false).await.unwrap();
    assert!(!svc.email_in_use("555").await.unwrap());
}

#[tokio::test]
async fn list_for_returns_only_that_users_contacts() {
    let (svc, user, _) = setup().await;

    svc.add(&user, ContactKind::Email, "bob@example.com", false)
        .await
        .unwrap();

    assert_eq!(svc.list_for(user.id).await.unwrap().len(), 1);
    assert!(svc.list_for(Uuid::new_v4()).await.unwrap().is_empty());
}
