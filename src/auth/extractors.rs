use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::auth::jwt::{Claims, JwtManager};
use crate::error::AppError;

/// Extractor for protected routes. Validates `Authorization: Bearer
/// <JWT>` against the `JwtManager` in the router state and exposes the
/// claims. Purely stateless: no storage lookup happens here.
#[derive(Debug, Clone)]
pub struct AuthClaims {
    pub sub: uuid::Uuid,
    #[allow(dead_code)]
    pub role: String,
    #[allow(dead_code)]
    pub exp: i64,
}

impl From<Claims> for AuthClaims {
    fn from(c: Claims) -> Self {
        Self {
            sub: c.sub,
            role: c.role,
            exp: c.exp,
        }
    }
}

impl FromRequestParts<JwtManager> for AuthClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        jwt_manager: &JwtManager,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::InvalidTokenFormat)?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::InvalidTokenFormat)?;

        const BEARER: &str = "Bearer ";
        if !auth_str.starts_with(BEARER) {
            return Err(AppError::InvalidTokenFormat);
        }

        let token = &auth_str[BEARER.len()..];

        let claims = jwt_manager.verify_access_token(token)?;

        Ok(AuthClaims::from(claims))
    }
}
