//! Identity resolution — mapping verified external identities to
//! internal users.

use idgate_core::error::IdgateResult;
use idgate_core::models::identity::ExternalIdentity;
use idgate_core::models::user::UserStatus;
use idgate_core::repository::{ExternalIdentityRepository, UserRepository};
use uuid::Uuid;

use crate::config::ProvisioningMode;
use crate::error::AccessError;

/// Reject blank issuer or subject before they reach storage.
pub(crate) fn validate_issuer_subject(issuer: &str, subject: &str) -> Result<(), AccessError> {
    if issuer.trim().is_empty() || subject.trim().is_empty() {
        return Err(AccessError::Validation(
            "issuer and subject must be non-blank".into(),
        ));
    }
    Ok(())
}

/// Identity resolution service.
///
/// Generic over repository implementations so that this layer has no
/// dependency on any storage backend. The provisioning policy is fixed at
/// construction from configuration; `resolve` is its only dispatch site.
pub struct IdentityService<E: ExternalIdentityRepository, U: UserRepository> {
    identities: E,
    users: U,
    policy: ProvisioningMode,
}

impl<E: ExternalIdentityRepository, U: UserRepository> IdentityService<E, U> {
    pub fn new(identities: E, users: U, policy: ProvisioningMode) -> Self {
        Self {
            identities,
            users,
            policy,
        }
    }

    /// Resolve a verified (issuer, subject) pair to an internal user id.
    ///
    /// On a miss the configured provisioning policy decides the outcome:
    /// `Ok(None)` signals "no access" and must be treated upstream as an
    /// authentication failure, not an internal error. No permission
    /// computation happens here — that is the RBAC aggregator's job,
    /// invoked afterward by the caller with the resolved id.
    pub async fn resolve(&self, issuer: &str, subject: &str) -> IdgateResult<Option<Uuid>> {
        validate_issuer_subject(issuer, subject)?;

        if let Some(identity) = self.identities.find_by_issuer_subject(issuer, subject).await? {
            return Ok(Some(identity.user_id));
        }

        match self.policy {
            ProvisioningMode::Deny => {
                tracing::warn!(issuer, subject, "unknown external identity denied");
                Ok(None)
            }
            ProvisioningMode::AutoProvision => {
                let user = self.users.create(UserStatus::Active).await?;
                self.identities
                    .link(user.id, issuer.to_string(), subject.to_string())
                    .await?;
                tracing::info!(
                    issuer,
                    subject,
                    user_id = %user.id,
                    "auto-provisioned user for unknown external identity"
                );
                Ok(Some(user.id))
            }
        }
    }

    /// Explicitly link (issuer, subject) to an existing user.
    ///
    /// Fails if the user does not exist or the pair is already linked
    /// anywhere — the repository enforces the uniqueness invariant
    /// atomically with the write.
    pub async fn link(
        &self,
        user_id: Uuid,
        issuer: &str,
        subject: &str,
    ) -> IdgateResult<ExternalIdentity> {
        validate_issuer_subject(issuer, subject)?;
        self.users.get_by_id(user_id).await?;
        self.identities
            .link(user_id, issuer.to_string(), subject.to_string())
            .await
    }

    /// Remove the link for (issuer, subject). `NotFound` if absent.
    pub async fn unlink(&self, issuer: &str, subject: &str) -> IdgateResult<()> {
        self.identities.unlink(issuer, subject).await
    }

    pub async fn identities_for(&self, user_id: Uuid) -> IdgateResult<Vec<ExternalIdentity>> {
        self.identities.list_by_user(user_id).await
    }
}
