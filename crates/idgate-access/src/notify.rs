//! Outbound notification boundary.
//!
//! Delivery is fire-and-forget from the core's perspective: services log
//! a failed delivery at warn level and never let it affect the workflow
//! outcome.

use idgate_core::error::IdgateResult;
use idgate_core::models::contact::ContactMethod;
use idgate_core::models::invitation::Invitation;
use idgate_core::models::user::User;

pub trait Notifier: Send + Sync {
    /// Invoked with the full invitation record after it is persisted.
    fn invitation_created(
        &self,
        invitation: &Invitation,
    ) -> impl Future<Output = IdgateResult<()>> + Send;

    /// Invoked after a contact method is created, verified or not.
    fn contact_added(
        &self,
        contact: &ContactMethod,
        user: &User,
    ) -> impl Future<Output = IdgateResult<()>> + Send;
}

/// Notifier that delivers nothing. Used in tests and as the default
/// wiring until a real delivery channel is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    async fn invitation_created(&self, invitation: &Invitation) -> IdgateResult<()> {
        tracing::debug!(invitation_id = %invitation.id, "invitation notification dropped");
        Ok(())
    }

    async fn contact_added(&self, contact: &ContactMethod, user: &User) -> IdgateResult<()> {
        tracing::debug!(
            contact_id = %contact.id,
            user_id = %user.id,
            "contact notification dropped"
        );
        Ok(())
    }
}
