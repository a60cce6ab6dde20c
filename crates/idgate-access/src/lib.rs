//! IDGATE Access — the service layer over `idgate-core` repositories.
//!
//! Identity resolution with pluggable provisioning, RBAC aggregation,
//! the invitation workflow, the contact-method registry, and
//! preference-layer merging. Every service is generic over the repository
//! traits it consumes so that this crate has no dependency on any storage
//! backend.

pub mod catalog;
pub mod config;
pub mod contact;
pub mod error;
pub mod identity;
pub mod invitation;
pub mod notify;
pub mod preferences;
pub mod rbac;
pub mod token;
pub mod users;

pub use catalog::PermissionCatalog;
pub use config::{AccessConfig, ProvisioningMode};
pub use contact::ContactService;
pub use error::AccessError;
pub use identity::IdentityService;
pub use invitation::{InvitationService, VerifiedClaims};
pub use notify::{Notifier, NoopNotifier};
pub use preferences::PreferenceService;
pub use rbac::RbacService;
pub use users::UserService;
