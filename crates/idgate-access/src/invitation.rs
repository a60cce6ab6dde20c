//! Invitation workflow — create, accept, revoke, list.
//!
//! The invitation state machine: `Pending --accept--> Accepted`,
//! `Pending --revoke--> Revoked`; once `now` passes `expires_at` the
//! invitation is treated as expired for all purposes without a stored
//! transition. `Accepted` and `Revoked` are terminal.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use idgate_core::error::IdgateResult;
use idgate_core::models::contact::ContactKind;
use idgate_core::models::invitation::{Invitation, InvitationStatus};
use idgate_core::models::user::UserStatus;
use idgate_core::repository::{
    ContactMethodRepository, CreateInvitation, ExternalIdentityRepository, InvitationFilter,
    InvitationRepository, RoleRepository, UserRepository,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::AccessConfig;
use crate::contact::{ContactService, normalize_email};
use crate::error::AccessError;
use crate::identity::validate_issuer_subject;
use crate::notify::Notifier;
use crate::token::generate_invite_token;

/// Claims extracted from an already-authenticated context. Verification
/// of the upstream token happened before this layer; the workflow trusts
/// these values as asserted by the issuer.
#[derive(Debug, Clone)]
pub struct VerifiedClaims {
    pub issuer: String,
    pub subject: String,
    pub email: String,
    pub email_verified: bool,
}

/// Invitation service.
///
/// Creation is serialized per normalized email through a keyed mutex so
/// that the "at most one pending invitation per email" invariant holds
/// even between the auto-revoke write and the insert of the replacement.
/// No global lock, one lock per email key.
pub struct InvitationService<I, U, E, R, C, N>
where
    I: InvitationRepository,
    U: UserRepository,
    E: ExternalIdentityRepository,
    R: RoleRepository,
    C: ContactMethodRepository,
    N: Notifier,
{
    invitations: I,
    users: U,
    identities: E,
    roles: R,
    contacts: ContactService<C, N>,
    notifier: N,
    config: AccessConfig,
    email_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<I, U, E, R, C, N> InvitationService<I, U, E, R, C, N>
where
    I: InvitationRepository,
    U: UserRepository,
    E: ExternalIdentityRepository,
    R: RoleRepository,
    C: ContactMethodRepository,
    N: Notifier,
{
    pub fn new(
        invitations: I,
        users: U,
        identities: E,
        roles: R,
        contacts: ContactService<C, N>,
        notifier: N,
        config: AccessConfig,
    ) -> Self {
        Self {
            invitations,
            users,
            identities,
            roles,
            contacts,
            notifier,
            config,
            email_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn email_lock(&self, email: &str) -> Arc<Mutex<()>> {
        let mut locks = self.email_locks.lock().await;
        locks.entry(email.to_string()).or_default().clone()
    }

    /// Issue an invitation.
    ///
    /// If a pending invitation already exists for the (normalized) email
    /// it is revoked and that write persisted before the new record is
    /// created, so no reader ever observes two pending invitations for
    /// one address.
    pub async fn create(
        &self,
        email: &str,
        role_id: Uuid,
        invited_by: Uuid,
    ) -> IdgateResult<Invitation> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(
                AccessError::Validation("invitation email must be non-blank".into()).into(),
            );
        }

        let lock = self.email_lock(&email).await;
        let _guard = lock.lock_owned().await;

        if self.contacts.email_in_use(&email).await? {
            return Err(AccessError::UserAlreadyExists(email).into());
        }
        self.roles.get_by_id(role_id).await?;

        if let Some(mut previous) = self.invitations.find_pending_by_email(&email).await? {
            previous.status = InvitationStatus::Revoked;
            let previous = self.invitations.save(previous).await?;
            tracing::info!(
                invitation_id = %previous.id,
                "revoked pending invitation superseded by a new one"
            );
        }

        let invitation = self
            .invitations
            .create(CreateInvitation {
                email,
                role_id,
                token: generate_invite_token(),
                invited_by,
                expires_at: Utc::now() + Duration::hours(self.config.invitation_ttl_hours),
            })
            .await?;

        if let Err(err) = self.notifier.invitation_created(&invitation).await {
            tracing::warn!(
                error = %err,
                invitation_id = %invitation.id,
                "invitation notification failed"
            );
        }

        tracing::info!(
            invitation_id = %invitation.id,
            role_id = %role_id,
            invited_by = %invited_by,
            "invitation created"
        );
        Ok(invitation)
    }

    /// Accept an invitation by token, provisioning the invited user.
    ///
    /// Validation runs to completion before the first write. The writes
    /// that follow (user, identity link, role assignment, contact
    /// method, status transition) are one ordered unit; if a later step
    /// fails, earlier persisted effects are an accepted cost. Atomicity
    /// is the surrounding platform's concern; ordering and validation are
    /// this core's contract.
    pub async fn accept(&self, token: &str, claims: VerifiedClaims) -> IdgateResult<Invitation> {
        let mut invitation = self.invitations.get_by_token(token).await?;

        let now = Utc::now();
        if invitation.is_expired(now) {
            return Err(AccessError::InvitationExpired.into());
        }
        match invitation.status {
            InvitationStatus::Pending => {}
            InvitationStatus::Accepted => {
                return Err(AccessError::InvitationAlreadyAccepted.into());
            }
            InvitationStatus::Revoked | InvitationStatus::Expired => {
                return Err(AccessError::InvitationRevoked.into());
            }
        }
        if normalize_email(&claims.email) != invitation.email {
            return Err(AccessError::EmailMismatch.into());
        }
        if self.config.require_verified_email && !claims.email_verified {
            return Err(AccessError::EmailNotVerified.into());
        }
        validate_issuer_subject(&claims.issuer, &claims.subject)?;
        // A role deleted between create and accept must not leave an
        // orphan user behind, so the existence check precedes any write.
        self.roles.get_by_id(invitation.role_id).await?;

        let user = self.users.create(UserStatus::Active).await?;
        self.identities
            .link(user.id, claims.issuer, claims.subject)
            .await?;
        self.roles
            .assign_to_user(user.id, invitation.role_id)
            .await?;

        let verified = self.config.trust_issuer_verification && claims.email_verified;
        self.contacts
            .add(&user, ContactKind::Email, &invitation.email, verified)
            .await?;

        invitation.status = InvitationStatus::Accepted;
        invitation.accepted_at = Some(now);
        let invitation = self.invitations.save(invitation).await?;

        tracing::info!(
            invitation_id = %invitation.id,
            user_id = %user.id,
            "invitation accepted"
        );
        Ok(invitation)
    }

    /// Revoke an invitation.
    ///
    /// Revoking an already-revoked (or expired) invitation is an
    /// idempotent no-op; revoking an accepted one is an error, since it
    /// has been consumed and the provisioned user exists.
    pub async fn revoke(&self, invitation_id: Uuid) -> IdgateResult<Invitation> {
        let mut invitation = self.invitations.get_by_id(invitation_id).await?;
        match invitation.status {
            InvitationStatus::Accepted => Err(AccessError::InvitationAlreadyAccepted.into()),
            InvitationStatus::Revoked => Ok(invitation),
            InvitationStatus::Pending | InvitationStatus::Expired => {
                invitation.status = InvitationStatus::Revoked;
                let invitation = self.invitations.save(invitation).await?;
                tracing::info!(invitation_id = %invitation.id, "invitation revoked");
                Ok(invitation)
            }
        }
    }

    pub async fn get(&self, invitation_id: Uuid) -> IdgateResult<Invitation> {
        self.invitations.get_by_id(invitation_id).await
    }

    /// List invitations. Filters combine independently.
    pub async fn list(&self, filter: InvitationFilter) -> IdgateResult<Vec<Invitation>> {
        self.invitations.list(filter).await
    }
}
