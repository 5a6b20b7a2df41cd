use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use session_manager_api::ErrorResponse;

/// Application-level error taxonomy. Every engine/service outcome maps
/// onto exactly one of these, and each carries its own HTTP status and
/// stable machine-readable code.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AppError {
    // === Session protocol outcomes ===
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Email already in use")]
    EmailInUse,
    #[error("Invalid refresh token")]
    InvalidToken,
    #[error("Refresh token expired")]
    ExpiredToken,
    #[error("Refresh token reuse detected")]
    ReuseDetected,
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Invalid token format")]
    InvalidTokenFormat,

    // === Generic request errors ===
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // === Infrastructure ===
    #[error("Storage unavailable: {0}")]
    Storage(String),
    #[error("Password hashing failed: {0}")]
    PasswordHashingFailed(String),
    #[error("Token generation failed: {0}")]
    TokenGenerationFailed(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, internal_detail) = self.get_error_info();

        if let Some(ref detail) = internal_detail {
            tracing::error!(error_code, %status, detail, "Internal server error");
        }

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details: None,
        });

        (status, body).into_response()
    }
}

impl AppError {
    /// Status, stable code, public message, and the detail that is logged
    /// but never sent to the client.
    fn get_error_info(&self) -> (StatusCode, &'static str, String, Option<String>) {
        match self {
            // 401 Unauthorized — deliberately uniform for credential
            // failures: the caller never learns whether the email or the
            // password was wrong.
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
                None,
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Invalid refresh token".to_string(),
                None,
            ),
            AppError::ExpiredToken => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_EXPIRED",
                "Refresh token expired, please log in again".to_string(),
                None,
            ),
            AppError::ReuseDetected => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_REUSE_DETECTED",
                "Session revoked after possible token theft, please log in again".to_string(),
                None,
            ),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
            }

            // 409 Conflict
            AppError::EmailInUse => (
                StatusCode::CONFLICT,
                "EMAIL_IN_USE",
                "Email already in use".to_string(),
                None,
            ),

            // 404 Not Found
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),

            // 400 Bad Request
            AppError::InvalidTokenFormat => (
                StatusCode::BAD_REQUEST,
                "INVALID_TOKEN_FORMAT",
                "Token format is invalid".to_string(),
                None,
            ),
            AppError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone(), None)
            }

            // 503 Service Unavailable — transient, retryable; never to be
            // read as an expiry or reuse signal.
            AppError::Storage(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORAGE_UNAVAILABLE",
                "Storage temporarily unavailable, please retry".to_string(),
                Some(msg.clone()),
            ),

            // 500 Internal Server Error
            AppError::PasswordHashingFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "HASHING_ERROR",
                "An error occurred while processing your request".to_string(),
                Some(msg.clone()),
            ),
            AppError::TokenGenerationFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "TOKEN_ERROR",
                "An error occurred while generating token".to_string(),
                Some(msg.clone()),
            ),
        }
    }

    // === Constructor helpers ===
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        AppError::InvalidInput(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        AppError::Storage(msg.into())
    }

    /// Returns the HTTP status code
    #[cfg_attr(not(test), expect(dead_code, reason = "Used in unit tests"))]
    pub fn status_code(&self) -> StatusCode {
        self.get_error_info().0
    }

    #[cfg_attr(not(test), expect(dead_code, reason = "Used in unit tests"))]
    pub fn error_code(&self) -> &'static str {
        self.get_error_info().1
    }
}

// === Conversions from module error types ===

impl From<crate::db::error::RepositoryError> for AppError {
    fn from(err: crate::db::error::RepositoryError) -> Self {
        use crate::db::error::RepositoryError;
        match err {
            RepositoryError::NotFound(msg) => AppError::not_found(msg),
            // The only unique column reachable through the service surface
            // is users.email.
            RepositoryError::UniqueViolation(_) => AppError::EmailInUse,
            RepositoryError::PoolError(msg)
            | RepositoryError::ForeignKeyViolation(msg)
            | RepositoryError::DatabaseError(msg) => AppError::storage(msg),
        }
    }
}

impl From<crate::auth::rotation::RotationError> for AppError {
    fn from(err: crate::auth::rotation::RotationError) -> Self {
        use crate::auth::rotation::RotationError;
        match err {
            RotationError::InvalidToken => AppError::InvalidToken,
            RotationError::ExpiredToken => AppError::ExpiredToken,
            RotationError::ReuseDetected => AppError::ReuseDetected,
            RotationError::Store(e) => e.into(),
        }
    }
}

impl From<crate::auth::jwt::JwtError> for AppError {
    fn from(err: crate::auth::jwt::JwtError) -> Self {
        use crate::auth::jwt::JwtError;
        match err {
            JwtError::GenerationFailed(e) => AppError::TokenGenerationFailed(e.to_string()),
            JwtError::Expired => AppError::unauthorized("Access token expired"),
            JwtError::Invalid => AppError::unauthorized("Invalid access token"),
        }
    }
}

impl From<crate::auth::password::PasswordError> for AppError {
    fn from(err: crate::auth::password::PasswordError) -> Self {
        AppError::PasswordHashingFailed(err.to_string())
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::rotation::RotationError;
    use crate::db::error::RepositoryError;

    #[test]
    fn protocol_outcomes_map_to_401() {
        for err in [
            AppError::InvalidCredentials,
            AppError::InvalidToken,
            AppError::ExpiredToken,
            AppError::ReuseDetected,
        ] {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn reuse_detected_has_a_distinct_code() {
        assert_eq!(AppError::ReuseDetected.error_code(), "TOKEN_REUSE_DETECTED");
        assert_ne!(
            AppError::ReuseDetected.error_code(),
            AppError::InvalidToken.error_code()
        );
    }

    #[test]
    fn email_in_use_maps_to_409() {
        assert_eq!(AppError::EmailInUse.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn storage_failure_maps_to_503_not_a_token_outcome() {
        let err: AppError = RotationError::Store(RepositoryError::PoolError(
            "connection refused".to_string(),
        ))
        .into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), "STORAGE_UNAVAILABLE");
    }

    #[test]
    fn rotation_outcomes_convert_one_to_one() {
        assert!(matches!(
            AppError::from(RotationError::InvalidToken),
            AppError::InvalidToken
        ));
        assert!(matches!(
            AppError::from(RotationError::ExpiredToken),
            AppError::ExpiredToken
        ));
        assert!(matches!(
            AppError::from(RotationError::ReuseDetected),
            AppError::ReuseDetected
        ));
    }

    #[test]
    fn reuse_detected_into_response_sets_401_status() {
        let response = AppError::ReuseDetected.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
