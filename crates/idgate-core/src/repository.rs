//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Each collection sits behind its own
//! trait and may be backed independently (in-memory, embedded, remote). The
//! service layer never assumes a shared transaction boundary across them;
//! cross-collection consistency is enforced by operation ordering in the
//! services.
//!
//! Naming convention: `get_*` methods treat absence as a `NotFound` error,
//! `find_*` methods return `Option` where absence is a normal outcome of the
//! calling workflow. Binding mutators return `bool` (whether anything
//! actually changed) so callers can implement idempotent-add /
//! erroring-remove semantics.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::IdgateResult;
use crate::models::{
    contact::{ContactKind, ContactMethod},
    identity::ExternalIdentity,
    invitation::{Invitation, InvitationStatus},
    permission::Permission,
    preferences::UserPreferences,
    role::Role,
    user::{User, UserStatus},
};

// ---------------------------------------------------------------------------
// Users & external identities
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    /// Create a user with a fresh id and the given initial status.
    fn create(&self, status: UserStatus) -> impl Future<Output = IdgateResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = IdgateResult<User>> + Send;
    /// Set the user's status and refresh `updated_at`.
    fn set_status(
        &self,
        id: Uuid,
        status: UserStatus,
    ) -> impl Future<Output = IdgateResult<User>> + Send;
    fn list(&self) -> impl Future<Output = IdgateResult<Vec<User>>> + Send;
}

pub trait ExternalIdentityRepository: Send + Sync {
    /// Link (issuer, subject) to a user.
    ///
    /// The uniqueness check and the write must be atomic with respect to
    /// concurrent links of the same pair (unique-constraint semantics):
    /// fails with `AlreadyExists` when the pair is already linked to any
    /// user.
    fn link(
        &self,
        user_id: Uuid,
        issuer: String,
        subject: String,
    ) -> impl Future<Output = IdgateResult<ExternalIdentity>> + Send;

    fn find_by_issuer_subject(
        &self,
        issuer: &str,
        subject: &str,
    ) -> impl Future<Output = IdgateResult<Option<ExternalIdentity>>> + Send;

    /// Remove the link for (issuer, subject). `NotFound` if absent.
    fn unlink(
        &self,
        issuer: &str,
        subject: &str,
    ) -> impl Future<Output = IdgateResult<()>> + Send;

    fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = IdgateResult<Vec<ExternalIdentity>>> + Send;
}

// ---------------------------------------------------------------------------
// Roles, permissions, bindings
// ---------------------------------------------------------------------------

pub trait RoleRepository: Send + Sync {
    /// Create a role with a fresh id. Name uniqueness is checked by the
    /// service before calling this.
    fn create(&self, name: String) -> impl Future<Output = IdgateResult<Role>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = IdgateResult<Role>> + Send;
    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = IdgateResult<Option<Role>>> + Send;
    /// Remove the role record only. Binding cleanup is the caller's ordered
    /// cascade — see `RbacService::delete_role`.
    fn delete(&self, id: Uuid) -> impl Future<Output = IdgateResult<()>> + Send;
    fn list(&self) -> impl Future<Output = IdgateResult<Vec<Role>>> + Send;

    /// Add a user-role binding. Returns `false` if it already existed.
    fn assign_to_user(
        &self,
        user_id: Uuid,
        role_id: Uuid,
    ) -> impl Future<Output = IdgateResult<bool>> + Send;

    /// Remove a user-role binding. Returns `false` if it did not exist.
    fn unassign_from_user(
        &self,
        user_id: Uuid,
        role_id: Uuid,
    ) -> impl Future<Output = IdgateResult<bool>> + Send;

    fn role_ids_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = IdgateResult<Vec<Uuid>>> + Send;

    /// Remove every user-role binding for a role; returns how many were
    /// removed.
    fn clear_assignments_for_role(
        &self,
        role_id: Uuid,
    ) -> impl Future<Output = IdgateResult<u64>> + Send;
}

pub trait PermissionRepository: Send + Sync {
    /// Register a permission. Fails with `AlreadyExists` on a duplicate id.
    fn create(
        &self,
        permission: Permission,
    ) -> impl Future<Output = IdgateResult<Permission>> + Send;
    fn find_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = IdgateResult<Option<Permission>>> + Send;
    fn list(&self) -> impl Future<Output = IdgateResult<Vec<Permission>>> + Send;

    /// Add a role-permission binding. Returns `false` if it already existed.
    fn grant_to_role(
        &self,
        role_id: Uuid,
        permission_id: String,
    ) -> impl Future<Output = IdgateResult<bool>> + Send;

    /// Remove a role-permission binding. Returns `false` if it did not
    /// exist.
    fn revoke_from_role(
        &self,
        role_id: Uuid,
        permission_id: &str,
    ) -> impl Future<Output = IdgateResult<bool>> + Send;

    /// Deduplicated permission ids granted to any of the given roles.
    fn permission_ids_for_roles(
        &self,
        role_ids: &[Uuid],
    ) -> impl Future<Output = IdgateResult<HashSet<String>>> + Send;

    /// Remove every role-permission binding for a role; returns how many
    /// were removed.
    fn clear_grants_for_role(
        &self,
        role_id: Uuid,
    ) -> impl Future<Output = IdgateResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Invitations
// ---------------------------------------------------------------------------

/// Caller-supplied fields for a new invitation. The repository allocates
/// the id and `created_at`, and stores the record as `Pending`.
#[derive(Debug, Clone)]
pub struct CreateInvitation {
    pub email: String,
    pub role_id: Uuid,
    pub token: String,
    pub invited_by: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Query filters for invitation listings. Both filters are optional and
/// combine independently.
#[derive(Debug, Clone, Default)]
pub struct InvitationFilter {
    pub status: Option<InvitationStatus>,
    pub since: Option<DateTime<Utc>>,
}

pub trait InvitationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateInvitation,
    ) -> impl Future<Output = IdgateResult<Invitation>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = IdgateResult<Invitation>> + Send;
    fn get_by_token(
        &self,
        token: &str,
    ) -> impl Future<Output = IdgateResult<Invitation>> + Send;
    fn find_pending_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = IdgateResult<Option<Invitation>>> + Send;
    /// Upsert, used for status transitions (revoke, accept).
    fn save(
        &self,
        invitation: Invitation,
    ) -> impl Future<Output = IdgateResult<Invitation>> + Send;
    fn list(
        &self,
        filter: InvitationFilter,
    ) -> impl Future<Output = IdgateResult<Vec<Invitation>>> + Send;
}

// ---------------------------------------------------------------------------
// Contact methods & preferences
// ---------------------------------------------------------------------------

/// Caller-supplied fields for a new contact method. The repository
/// allocates the id and `created_at`; `verified_at` is set iff `verified`.
#[derive(Debug, Clone)]
pub struct CreateContactMethod {
    pub user_id: Uuid,
    pub kind: ContactKind,
    /// Already normalized by the service.
    pub value: String,
    pub verified: bool,
}

pub trait ContactMethodRepository: Send + Sync {
    fn create(
        &self,
        input: CreateContactMethod,
    ) -> impl Future<Output = IdgateResult<ContactMethod>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = IdgateResult<ContactMethod>> + Send;
    /// Whether any EMAIL contact method has this exact normalized value,
    /// for any user.
    fn email_value_exists(
        &self,
        value: &str,
    ) -> impl Future<Output = IdgateResult<bool>> + Send;
    /// Upsert, used for the one-way verification transition.
    fn save(
        &self,
        contact: ContactMethod,
    ) -> impl Future<Output = IdgateResult<ContactMethod>> + Send;
    fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = IdgateResult<Vec<ContactMethod>>> + Send;
}

pub trait PreferencesRepository: Send + Sync {
    /// Overwrite the document stored under (user, namespace), creating the
    /// record if absent.
    fn upsert(
        &self,
        user_id: Uuid,
        namespace: String,
        data: serde_json::Value,
    ) -> impl Future<Output = IdgateResult<UserPreferences>> + Send;
    fn find(
        &self,
        user_id: Uuid,
        namespace: &str,
    ) -> impl Future<Output = IdgateResult<Option<UserPreferences>>> + Send;
}
