//! Invitation domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
    Revoked,
}

/// A time-boxed, single-use invitation that provisions a new user on
/// acceptance.
///
/// `Accepted` and `Revoked` are terminal. Expiry is a derived state: an
/// invitation is treated as expired the moment `now` passes `expires_at`,
/// regardless of the stored status — nothing writes `Expired` back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    pub id: Uuid,
    /// Invitee address, normalized (lowercased, trimmed).
    pub email: String,
    /// Role granted to the provisioned user on acceptance.
    pub role_id: Uuid,
    /// Unguessable single-use token, unique across all invitations.
    pub token: String,
    pub status: InvitationStatus,
    /// User id of the administrator who issued the invitation.
    pub invited_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Invitation {
    /// Whether the invitation is past its deadline at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
