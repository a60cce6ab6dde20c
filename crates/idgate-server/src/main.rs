//! IDGATE Server — application entry point.
//!
//! Wires the in-memory repositories into the access services. The HTTP
//! transport is not part of this core; a routing layer mounts on top of
//! the services constructed here.

use idgate_access::{
    AccessConfig, ContactService, IdentityService, InvitationService, NoopNotifier,
    PermissionCatalog, PreferenceService, RbacService, UserService,
};
use idgate_memory::{
    MemoryContactMethodRepository, MemoryExternalIdentityRepository, MemoryInvitationRepository,
    MemoryPermissionRepository, MemoryPreferencesRepository, MemoryRoleRepository,
    MemoryUserRepository,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("idgate=info".parse().unwrap()))
        .json()
        .init();

    let config = AccessConfig::from_env();
    tracing::info!(
        invitation_ttl_hours = config.invitation_ttl_hours,
        require_verified_email = config.require_verified_email,
        trust_issuer_verification = config.trust_issuer_verification,
        provisioning = ?config.provisioning,
        "starting IDGATE"
    );

    let users = MemoryUserRepository::new();
    let identities = MemoryExternalIdentityRepository::new();
    let roles = MemoryRoleRepository::new();
    let permissions = MemoryPermissionRepository::new();
    let invitations = MemoryInvitationRepository::new();
    let contacts = MemoryContactMethodRepository::new();
    let preferences = MemoryPreferencesRepository::new();

    let _identity = IdentityService::new(identities.clone(), users.clone(), config.provisioning);
    let _rbac = RbacService::new(roles.clone(), permissions.clone(), users.clone());
    let _catalog = PermissionCatalog::new(permissions.clone());
    let _invitation = InvitationService::new(
        invitations,
        users.clone(),
        identities,
        roles,
        ContactService::new(contacts, Some(NoopNotifier)),
        NoopNotifier,
        config,
    );
    let _preferences = PreferenceService::new(preferences);
    let _users = UserService::new(users);

    // TODO: mount the HTTP routing layer over these services.
    tracing::info!("IDGATE core services wired; no transport mounted");
}
