//! Invitation token generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Generate a cryptographically random opaque invitation token
/// (32 bytes → base64url-encoded, no padding).
///
/// The token is the invitation's natural key: it is stored on the record
/// and looked up verbatim on acceptance.
pub fn generate_invite_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_token_is_url_safe() {
        let token = generate_invite_token();
        // base64url characters only (A-Z a-z 0-9 - _), no padding.
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        // 32 bytes → 43 base64url chars.
        assert_eq!(token.len(), 43);
    }

    #[test]
    fn invite_tokens_are_unique() {
        assert_ne!(generate_invite_token(), generate_invite_token());
    }
}
