//! Integration tests for the invitation workflow.

use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use idgate_access::config::{AccessConfig, ProvisioningMode};
use idgate_access::contact::ContactService;
use idgate_access::invitation::{InvitationService, VerifiedClaims};
use idgate_access::notify::Notifier;
use idgate_core::error::{IdgateError, IdgateResult};
use idgate_core::models::contact::{ContactKind, ContactMethod};
use idgate_core::models::invitation::{Invitation, InvitationStatus};
use idgate_core::models::user::{User, UserStatus};
use idgate_core::repository::{
    ContactMethodRepository, CreateContactMethod, ExternalIdentityRepository, InvitationFilter,
    InvitationRepository, RoleRepository, UserRepository,
};
use idgate_memory::{
    MemoryContactMethodRepository, MemoryExternalIdentityRepository, MemoryInvitationRepository,
    MemoryRoleRepository, MemoryUserRepository,
};
use uuid::Uuid;

/// Notifier that records every delivery for assertions.
#[derive(Clone, Default)]
struct RecordingNotifier {
    events: Arc<Mutex<Vec<String>>>,
}

impl Notifier for RecordingNotifier {
    async fn invitation_created(&self, invitation: &Invitation) -> IdgateResult<()> {
        self.events
            .lock()
            .unwrap()
            .push(format!("invitation:{}", invitation.email));
        Ok(())
    }

    async fn contact_added(&self, contact: &ContactMethod, user: &User) -> IdgateResult<()> {
        self.events
            .lock()
            .unwrap()
            .push(format!("contact:{}:{}", user.id, contact.value));
        Ok(())
    }
}

type Service = InvitationService<
    MemoryInvitationRepository,
    MemoryUserRepository,
    MemoryExternalIdentityRepository,
    MemoryRoleRepository,
    MemoryContactMethodRepository,
    RecordingNotifier,
>;

struct Setup {
    svc: Service,
    users: MemoryUserRepository,
    identities: MemoryExternalIdentityRepository,
    roles: MemoryRoleRepository,
    invitations: MemoryInvitationRepository,
    contacts: MemoryContactMethodRepository,
    admin_id: Uuid,
    role_id: Uuid,
    events: Arc<Mutex<Vec<String>>>,
}

/// Build a service over fresh in-memory stores with one admin and one
/// role to invite into.
async fn setup(config: AccessConfig) -> Setup {
    let users = MemoryUserRepository::new();
    let identities = MemoryExternalIdentityRepository::new();
    let roles = MemoryRoleRepository::new();
    let invitations = MemoryInvitationRepository::new();
    let contacts = MemoryContactMethodRepository::new();

    let admin = users.create(UserStatus::Active).await.unwrap();
    let role = roles.create("member".into()).await.unwrap();

    let notifier = RecordingNotifier::default();
    let events = notifier.events.clone();

    let svc = InvitationService::new(
        invitations.clone(),
        users.clone(),
        identities.clone(),
        roles.clone(),
        ContactService::new(contacts.clone(), Some(notifier.clone())),
        notifier,
        config,
    );

    Setup {
        svc,
        users,
        identities,
        roles,
        invitations,
        contacts,
        admin_id: admin.id,
        role_id: role.id,
        events,
    }
}

fn test_config() -> AccessConfig {
    AccessConfig {
        invitation_ttl_hours: 24,
        require_verified_email: true,
        trust_issuer_verification: true,
        provisioning: ProvisioningMode::Deny,
    }
}

fn claims(email: &str, email_verified: bool) -> VerifiedClaims {
    VerifiedClaims {
        issuer: "idp".into(),
        subject: "s1".into(),
        email: email.into(),
        email_verified,
    }
}

// ---------------------------------------------------------------------------
// create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_normalizes_email_and_starts_pending() {
    let s = setup(test_config()).await;

    let before = Utc::now();
    let invitation = s
        .svc
        .create("  Alice@EXAMPLE.com ", s.role_id, s.admin_id)
        .await
        .unwrap();

    assert_eq!(invitation.email, "alice@example.com");
    assert_eq!(invitation.status, InvitationStatus::Pending);
    assert_eq!(invitation.invited_by, s.admin_id);
    assert!(invitation.accepted_at.is_none());
    assert!(!invitation.token.is_empty());
    // 24h TTL.
    assert!(invitation.expires_at >= before + Duration::hours(24));
    assert!(invitation.expires_at <= Utc::now() + Duration::hours(24));
}

#[tokio::test]
async fn create_blank_email_fails() {
    let s = setup(test_config()).await;

    let err = s.svc.create("   ", s.role_id, s.admin_id).await.unwrap_err();
    assert!(matches!(err, IdgateError::Validation { .. }));
}

#[tokio::test]
async fn create_unknown_role_fails() {
    let s = setup(test_config()).await;

    let err = s
        .svc
        .create("alice@example.com", Uuid::new_v4(), s.admin_id)
        .await
        .unwrap_err();
    assert!(
        matches!(err, IdgateError::NotFound { ref entity, .. } if entity == "role"),
        "expected role NotFound, got: {err:?}"
    );
}

#[tokio::test]
async fn create_for_existing_account_fails() {
    let s = setup(test_config()).await;

    // An account already owns this address (stored normalized).
    let owner = s.users.create(UserStatus::Active).await.unwrap();
    s.contacts
        .create(CreateContactMethod {
            user_id: owner.id,
            kind: ContactKind::Email,
            value: "alice@example.com".into(),
            verified: true,
        })
        .await
        .unwrap();

    let err = s
        .svc
        .create("Alice@example.com", s.role_id, s.admin_id)
        .await
        .unwrap_err();
    assert!(matches!(err, IdgateError::AlreadyExists { .. }));
}

#[tokio::test]
async fn second_create_revokes_first() {
    let s = setup(test_config()).await;

    let first = s
        .svc
        .create("alice@example.com", s.role_id, s.admin_id)
        .await
        .unwrap();
    let second = s
        .svc
        .create("ALICE@example.com", s.role_id, s.admin_id)
        .await
        .unwrap();

    // Exactly one pending invitation per email.
    let pending = s
        .invitations
        .list(InvitationFilter {
            status: Some(InvitationStatus::Pending),
            since: None,
        })
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second.id);

    let first = s.invitations.get_by_id(first.id).await.unwrap();
    assert_eq!(first.status, InvitationStatus::Revoked);
}

#[tokio::test]
async fn create_notifies() {
    let s = setup(test_config()).await;

    s.svc
        .create("alice@example.com", s.role_id, s.admin_id)
        .await
        .unwrap();

    let events = s.events.lock().unwrap();
    assert_eq!(events.as_slice(), ["invitation:alice@example.com"]);
}

// ---------------------------------------------------------------------------
// accept
// ---------------------------------------------------------------------------

#[tokio::test]
async fn accept_happy_path() {
    let s = setup(test_config()).await;

    let invitation = s
        .svc
        .create("Alice@EXAMPLE.com", s.role_id, s.admin_id)
        .await
        .unwrap();

    let accepted = s
        .svc
        .accept(&invitation.token, claims("alice@example.com", true))
        .await
        .unwrap();

    assert_eq!(accepted.status, InvitationStatus::Accepted);
    assert!(accepted.accepted_at.is_some());

    // A new active user, linked to (idp, s1).
    let identity = s
        .identities
        .find_by_issuer_subject("idp", "s1")
        .await
        .unwrap()
        .expect("identity should be linked");
    let user = s.users.get_by_id(identity.user_id).await.unwrap();
    assert_eq!(user.status, UserStatus::Active);
    assert_ne!(user.id, s.admin_id);

    // The invitation's role is assigned.
    let role_ids = s.roles.role_ids_for_user(user.id).await.unwrap();
    assert_eq!(role_ids, vec![s.role_id]);

    // A verified email contact method exists (issuer verification is
    // trusted and the claim asserted verified).
    let contacts = s.contacts.list_by_user(user.id).await.unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].kind, ContactKind::Email);
    assert_eq!(contacts[0].value, "alice@example.com");
    assert!(contacts[0].verified);
    assert!(contacts[0].verified_at.is_some());

    // Both deliveries went out.
    let events = s.events.lock().unwrap();
    assert!(events.contains(&"invitation:alice@example.com".to_string()));
    assert!(events.contains(&format!("contact:{}:alice@example.com", user.id)));
}

#[tokio::test]
async fn accept_unverified_email_fails_without_side_effects() {
    let s = setup(test_config()).await;

    let invitation = s
        .svc
        .create("alice@example.com", s.role_id, s.admin_id)
        .await
        .unwrap();

    let err = s
        .svc
        .accept(&invitation.token, claims("alice@example.com", false))
        .await
        .unwrap_err();

    match &err {
        IdgateError::InvalidState { reason } => {
            assert!(reason.contains("not verified"), "reason: {reason}");
        }
        other => panic!("expected InvalidState, got {other:?}"),
    }

    // No user was created — only the admin from setup exists.
    assert_eq!(s.users.list().await.unwrap().len(), 1);
    assert!(
        s.identities
            .find_by_issuer_subject("idp", "s1")
            .await
            .unwrap()
            .is_none()
    );

    // Still pending; a later verified accept succeeds.
    let retried = s
        .svc
        .accept(&invitation.token, claims("alice@example.com", true))
        .await
        .unwrap();
    assert_eq!(retried.status, InvitationStatus::Accepted);
}

#[tokio::test]
async fn accept_untrusted_issuer_creates_unverified_contact() {
    let mut config = test_config();
    config.require_verified_email = false;
    config.trust_issuer_verification = false;
    let s = setup(config).await;

    let invitation = s
        .svc
        .create("alice@example.com", s.role_id, s.admin_id)
        .await
        .unwrap();
    s.svc
        .accept(&invitation.token, claims("alice@example.com", true))
        .await
        .unwrap();

    let identity = s
        .identities
        .find_by_issuer_subject("idp", "s1")
        .await
        .unwrap()
        .unwrap();
    let contacts = s.contacts.list_by_user(identity.user_id).await.unwrap();
    assert_eq!(contacts.len(), 1);
    assert!(!contacts[0].verified);
    assert!(contacts[0].verified_at.is_none());

    // The contact-added delivery goes out regardless of verification.
    let events = s.events.lock().unwrap();
    assert!(
        events
            .iter()
            .any(|event| event.starts_with(&format!("contact:{}", identity.user_id)))
    );
}

#[tokio::test]
async fn accept_email_mismatch_fails() {
    let s = setup(test_config()).await;

    let invitation = s
        .svc
        .create("alice@example.com", s.role_id, s.admin_id)
        .await
        .unwrap();

    let err = s
        .svc
        .accept(&invitation.token, claims("bob@example.com", true))
        .await
        .unwrap_err();
    match &err {
        IdgateError::InvalidState { reason } => {
            assert!(reason.contains("does not match"), "reason: {reason}");
        }
        other => panic!("expected InvalidState, got {other:?}"),
    }
    assert_eq!(s.users.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn accept_expired_fails_regardless_of_stored_status() {
    let s = setup(test_config()).await;

    let invitation = s
        .svc
        .create("alice@example.com", s.role_id, s.admin_id)
        .await
        .unwrap();

    // Age the invitation past its deadline.
    let mut stored = s.invitations.get_by_id(invitation.id).await.unwrap();
    stored.expires_at = Utc::now() - Duration::hours(1);
    s.invitations.save(stored).await.unwrap();

    let err = s
        .svc
        .accept(&invitation.token, claims("alice@example.com", true))
        .await
        .unwrap_err();
    match &err {
        IdgateError::InvalidState { reason } => {
            assert!(reason.contains("expired"), "reason: {reason}");
        }
        other => panic!("expected InvalidState, got {other:?}"),
    }

    // Even a revoked record reports expiry first.
    let mut stored = s.invitations.get_by_id(invitation.id).await.unwrap();
    stored.status = InvitationStatus::Revoked;
    s.invitations.save(stored).await.unwrap();

    let err = s
        .svc
        .accept(&invitation.token, claims("alice@example.com", true))
        .await
        .unwrap_err();
    assert!(
        matches!(err, IdgateError::InvalidState { ref reason } if reason.contains("expired"))
    );
}

#[tokio::test]
async fn accept_same_token_twice_fails() {
    let s = setup(test_config()).await;

    let invitation = s
        .svc
        .create("alice@example.com", s.role_id, s.admin_id)
        .await
        .unwrap();
    s.svc
        .accept(&invitation.token, claims("alice@example.com", true))
        .await
        .unwrap();

    let err = s
        .svc
        .accept(&invitation.token, claims("alice@example.com", true))
        .await
        .unwrap_err();
    match &err {
        IdgateError::InvalidState { reason } => {
            assert!(reason.contains("already been accepted"), "reason: {reason}");
        }
        other => panic!("expected InvalidState, got {other:?}"),
    }
}

#[tokio::test]
async fn accept_revoked_fails() {
    let s = setup(test_config()).await;

    let invitation = s
        .svc
        .create("alice@example.com", s.role_id, s.admin_id)
        .await
        .unwrap();
    s.svc.revoke(invitation.id).await.unwrap();

    let err = s
        .svc
        .accept(&invitation.token, claims("alice@example.com", true))
        .await
        .unwrap_err();
    assert!(matches!(err, IdgateError::InvalidState { ref reason } if reason.contains("revoked")));
}

#[tokio::test]
async fn accept_unknown_token_fails() {
    let s = setup(test_config()).await;

    let err = s
        .svc
        .accept("no-such-token", claims("alice@example.com", true))
        .await
        .unwrap_err();
    assert!(matches!(err, IdgateError::NotFound { .. }));
}

#[tokio::test]
async fn accept_deleted_role_fails_without_creating_user() {
    let s = setup(test_config()).await;

    let invitation = s
        .svc
        .create("alice@example.com", s.role_id, s.admin_id)
        .await
        .unwrap();
    s.roles.delete(s.role_id).await.unwrap();

    let err = s
        .svc
        .accept(&invitation.token, claims("alice@example.com", true))
        .await
        .unwrap_err();
    assert!(matches!(err, IdgateError::NotFound { ref entity, .. } if entity == "role"));
    assert_eq!(s.users.list().await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// revoke & list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn revoke_pending_invitation() {
    let s = setup(test_config()).await;

    let invitation = s
        .svc
        .create("alice@example.com", s.role_id, s.admin_id)
        .await
        .unwrap();
    let revoked = s.svc.revoke(invitation.id).await.unwrap();
    assert_eq!(revoked.status, InvitationStatus::Revoked);

    // Revoking again is a no-op, not an error.
    let again = s.svc.revoke(invitation.id).await.unwrap();
    assert_eq!(again.status, InvitationStatus::Revoked);
}

#[tokio::test]
async fn revoke_accepted_invitation_fails() {
    let s = setup(test_config()).await;

    let invitation = s
        .svc
        .create("alice@example.com", s.role_id, s.admin_id)
        .await
        .unwrap();
    s.svc
        .accept(&invitation.token, claims("alice@example.com", true))
        .await
        .unwrap();

    let err = s.svc.revoke(invitation.id).await.unwrap_err();
    assert!(
        matches!(err, IdgateError::InvalidState { ref reason } if reason.contains("accepted"))
    );
    // The record is untouched.
    let stored = s.invitations.get_by_id(invitation.id).await.unwrap();
    assert_eq!(stored.status, InvitationStatus::Accepted);
}

#[tokio::test]
async fn revoke_unknown_invitation_fails() {
    let s = setup(test_config()).await;

    let err = s.svc.revoke(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, IdgateError::NotFound { .. }));
}

#[tokio::test]
async fn list_filters_combine_independently() {
    let s = setup(test_config()).await;

    let first = s
        .svc
        .create("alice@example.com", s.role_id, s.admin_id)
        .await
        .unwrap();
    s.svc
        .create("bob@example.com", s.role_id, s.admin_id)
        .await
        .unwrap();
    s.svc.revoke(first.id).await.unwrap();

    let all = s.svc.list(InvitationFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    let pending = s
        .svc
        .list(InvitationFilter {
            status: Some(InvitationStatus::Pending),
            since: None,
        })
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].email, "bob@example.com");

    let revoked = s
        .svc
        .list(InvitationFilter {
            status: Some(InvitationStatus::Revoked),
            since: None,
        })
        .await
        .unwrap();
    assert_eq!(revoked.len(), 1);

    let none_recent = s
        .svc
        .list(InvitationFilter {
            status: None,
            since: Some(Utc::now() + Duration::hours(1)),
        })
        .await
        .unwrap();
    assert!(none_recent.is_empty());

    let revoked_recent = s
        .svc
        .list(InvitationFilter {
            status: Some(InvitationStatus::Revoked),
            since: Some(Utc::now() - Duration::hours(1)),
        })
        .await
        .unwrap();
    assert_eq!(revoked_recent.len(), 1);
}
