//! User administration — status transitions and lookups.

use idgate_core::error::IdgateResult;
use idgate_core::models::user::{User, UserStatus};
use idgate_core::repository::UserRepository;
use uuid::Uuid;

/// Thin administrative surface over the user collection. Users are
/// created by provisioning or invitation acceptance; status transitions
/// are driven here by the caller.
pub struct UserService<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> UserService<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    pub async fn get(&self, user_id: Uuid) -> IdgateResult<User> {
        self.users.get_by_id(user_id).await
    }

    pub async fn list(&self) -> IdgateResult<Vec<User>> {
        self.users.list().await
    }

    /// Set a user's status. `updated_at` is refreshed by the repository.
    pub async fn set_status(&self, user_id: Uuid, status: UserStatus) -> IdgateResult<User> {
        let user = self.users.set_status(user_id, status).await?;
        tracing::info!(user_id = %user.id, status = ?user.status, "user status changed");
        Ok(user)
    }
}
