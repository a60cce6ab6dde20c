//! In-memory repository implementations, one module per collection.

mod contact;
mod identity;
mod invitation;
mod permission;
mod preferences;
mod role;
mod user;

pub use contact::MemoryContactMethodRepository;
pub use identity::MemoryExternalIdentityRepository;
pub use invitation::MemoryInvitationRepository;
pub use permission::MemoryPermissionRepository;
pub use preferences::MemoryPreferencesRepository;
pub use role::MemoryRoleRepository;
pub use user::MemoryUserRepository;
