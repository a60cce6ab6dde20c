//! In-memory implementation of [`InvitationRepository`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use idgate_core::error::{IdgateError, IdgateResult};
use idgate_core::models::invitation::{Invitation, InvitationStatus};
use idgate_core::repository::{CreateInvitation, InvitationFilter, InvitationRepository};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MemoryInvitationRepository {
    inner: Arc<RwLock<HashMap<Uuid, Invitation>>>,
}

impl MemoryInvitationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> IdgateResult<RwLockReadGuard<'_, HashMap<Uuid, Invitation>>> {
        self.inner
            .read()
            .map_err(|_| IdgateError::Storage("invitation store lock poisoned".into()))
    }

    fn write(&self) -> IdgateResult<RwLockWriteGuard<'_, HashMap<Uuid, Invitation>>> {
        self.inner
            .write()
            .map_err(|_| IdgateError::Storage("invitation store lock poisoned".into()))
    }
}

impl InvitationRepository for MemoryInvitationRepository {
    async fn create(&self, input: CreateInvitation) -> IdgateResult<Invitation> {
        let mut invitations = self.write()?;
        // Token uniqueness, the analog of a unique index.
        if invitations
            .values()
            .any(|invitation| invitation.token == input.token)
        {
            return Err(IdgateError::AlreadyExists {
                entity: "invitation token".into(),
            });
        }
        let invitation = Invitation {
            id: Uuid::new_v4(),
            email: input.email,
            role_id: input.role_id,
            token: input.token,
            status: InvitationStatus::Pending,
            invited_by: input.invited_by,
            created_at: Utc::now(),
            expires_at: input.expires_at,
            accepted_at: None,
        };
        invitations.insert(invitation.id, invitation.clone());
        Ok(invitation)
    }

    async fn get_by_id(&self, id: Uuid) -> IdgateResult<Invitation> {
        self.read()?
            .get(&id)
            .cloned()
            .ok_or_else(|| IdgateError::NotFound {
                entity: "invitation".into(),
                id: id.to_string(),
            })
    }

    async fn get_by_token(&self, token: &str) -> IdgateResult<Invitation> {
        self.read()?
            .values()
            .find(|invitation| invitation.token == token)
            .cloned()
            .ok_or_else(|| IdgateError::NotFound {
                entity: "invitation".into(),
                id: "with given token".into(),
            })
    }

    async fn find_pending_by_email(&self, email: &str) -> IdgateResult<Option<Invitation>> {
        Ok(self
            .read()?
            .values()
            .find(|invitation| {
                invitation.email == email && invitation.status == InvitationStatus::Pending
            })
            .cloned())
    }

    async fn save(&self, invitation: Invitation) -> IdgateResult<Invitation> {
        self.write()?.insert(invitation.id, invitation.clone());
        Ok(invitation)
    }

    async fn list(&self, filter: InvitationFilter) -> IdgateResult<Vec<Invitation>> {
        let mut invitations: Vec<Invitation> = self
            .read()?
            .values()
            .filter(|invitation| {
                filter
                    .status
                    .is_none_or(|status| invitation.status == status)
                    && filter
                        .since
                        .is_none_or(|since| invitation.created_at >= since)
            })
            .cloned()
            .collect();
        invitations.sort_by_key(|invitation| (invitation.created_at, invitation.id));
        Ok(invitations)
    }
}
