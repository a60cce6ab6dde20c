//! IDGATE Memory — in-memory implementations of the `idgate-core`
//! repository traits.
//!
//! Each repository is an `Arc<RwLock<…>>` over plain maps, cheap to
//! clone and share. Natural-key uniqueness (external identity pairs,
//! invitation tokens) is enforced by check-and-insert under a single
//! write lock, the in-process analog of a database unique constraint.
//! Used by the integration tests and as the default server wiring.

pub mod repository;

pub use repository::{
    MemoryContactMethodRepository, MemoryExternalIdentityRepository, MemoryInvitationRepository,
    MemoryPermissionRepository, MemoryPreferencesRepository, MemoryRoleRepository,
    MemoryUserRepository,
};
