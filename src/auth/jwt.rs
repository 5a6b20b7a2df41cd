use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token generation failed: {0}")]
    GenerationFailed(jsonwebtoken::errors::Error),
    #[error("Access token expired")]
    Expired,
    #[error("Invalid access token")]
    Invalid,
}

/// Access-token claims: who, what role, and the validity window.
/// Verification is signature + expiry only, never a storage lookup.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_minutes: i64,
}

impl JwtManager {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            ttl_minutes,
        }
    }

    /// Signs an access token with the configured TTL.
    pub fn sign_access_token(&self, user_id: Uuid, role: &str) -> Result<String, JwtError> {
        self.sign_with_ttl(user_id, role, self.ttl_minutes)
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_minutes * 60
    }

    pub fn sign_with_ttl(
        &self,
        user_id: Uuid,
        role: &str,
        ttl_minutes: i64,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let exp = (now + Duration::minutes(ttl_minutes)).timestamp();

        let claims = Claims {
            sub: user_id,
            role: role.to_string(),
            exp,
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(JwtError::GenerationFailed)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{JwtError, JwtManager, Uuid};

    fn make_jwt_manager() -> JwtManager {
        JwtManager::new("my_secret_key_for_tests", 15)
    }

    #[test]
    fn sign_and_verify_succeeds_with_valid_token() {
        let jwt = make_jwt_manager();
        let user_id = Uuid::new_v4();
        let token = jwt
            .sign_access_token(user_id, "user")
            .expect("Token generation failed");
        let claims = jwt
            .verify_access_token(&token)
            .expect("Token verification failed");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, "user");
        assert!(claims.exp > claims.iat, "Expiry should be after issued time");
    }

    #[test]
    fn sign_returns_jwt_with_correct_format() {
        let jwt = make_jwt_manager();
        let token = jwt
            .sign_access_token(Uuid::new_v4(), "admin")
            .expect("Token generation should succeed");

        assert!(!token.is_empty(), "Token should not be empty");
        assert!(
            token.contains('.'),
            "JWT should have dots (header.payload.signature)"
        );
    }

    #[test]
    fn verify_fails_with_invalid_input() {
        let jwt = make_jwt_manager();

        let result = jwt.verify_access_token("invalid.token.here");

        assert!(matches!(result.unwrap_err(), JwtError::Invalid));
    }

    #[test]
    fn verify_rejects_token_signed_with_different_key() {
        let signer = JwtManager::new("key_one", 15);
        let verifier = JwtManager::new("key_two", 15);

        let token = signer
            .sign_access_token(Uuid::new_v4(), "user")
            .expect("sign");
        let result = verifier.verify_access_token(&token);

        assert!(matches!(result.unwrap_err(), JwtError::Invalid));
    }

    #[test]
    fn verify_distinguishes_expired_from_invalid() {
        let jwt = make_jwt_manager();
        // Well past the default validation leeway
        let token = jwt
            .sign_with_ttl(Uuid::new_v4(), "user", -5)
            .expect("sign");

        let result = jwt.verify_access_token(&token);

        assert!(matches!(result.unwrap_err(), JwtError::Expired));
    }
}
