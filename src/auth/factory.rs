use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;

// 40 bytes of entropy per secret; families only need to be unique, 16
// bytes is plenty.
const SECRET_LEN: usize = 40;
const FAMILY_LEN: usize = 16;

/// Produces the opaque random material of the protocol: refresh secrets
/// and family identifiers. Access tokens are signed in `auth::jwt`.
pub struct TokenFactory;

impl TokenFactory {
    /// A new refresh secret. Returned in plaintext exactly once, at
    /// issuance; infeasible to predict or enumerate.
    pub fn new_refresh_secret() -> String {
        Self::random_string(SECRET_LEN)
    }

    /// A new family identifier, independent of any refresh secret.
    pub fn new_family_id() -> String {
        Self::random_string(FAMILY_LEN)
    }

    fn random_string(len: usize) -> String {
        let mut bytes = vec![0u8; len];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}
