//! Access-layer configuration.

use std::str::FromStr;

/// What to do when an external identity has no linked internal user.
///
/// Selected once at startup; the resolver holds the chosen variant and
/// dispatches on it at its single decision site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningMode {
    /// Refuse access. The attempt is logged; the caller sees "no user".
    Deny,
    /// Create an active user and link the identity to it.
    AutoProvision,
}

/// Configuration for the access services.
#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// Invitation lifetime in hours (default: 72).
    pub invitation_ttl_hours: i64,
    /// Whether accepting an invitation requires the issuer-asserted email
    /// to be verified (default: true).
    pub require_verified_email: bool,
    /// Whether issuer-level verification is trusted to mark the contact
    /// method created on acceptance as verified (default: true).
    pub trust_issuer_verification: bool,
    /// Policy for unknown external identities (default: Deny).
    pub provisioning: ProvisioningMode,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            invitation_ttl_hours: 72,
            require_verified_email: true,
            trust_issuer_verification: true,
            provisioning: ProvisioningMode::Deny,
        }
    }
}

impl AccessConfig {
    /// Read configuration from `IDGATE_*` environment variables, falling
    /// back to the documented defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            invitation_ttl_hours: env_or(
                "IDGATE_INVITATION_TTL_HOURS",
                defaults.invitation_ttl_hours,
            ),
            require_verified_email: env_or(
                "IDGATE_REQUIRE_VERIFIED_EMAIL",
                defaults.require_verified_email,
            ),
            trust_issuer_verification: env_or(
                "IDGATE_TRUST_ISSUER_VERIFICATION",
                defaults.trust_issuer_verification,
            ),
            provisioning: match std::env::var("IDGATE_PROVISIONING").as_deref() {
                Ok("auto-provision") => ProvisioningMode::AutoProvision,
                Ok("deny") => ProvisioningMode::Deny,
                _ => defaults.provisioning,
            },
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
