use axum::{
    Json,
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
};
use std::sync::Arc;

use crate::auth::extractors::AuthClaims;
use crate::auth::rotation::ClientContext;
use crate::auth::services::SessionService;
use crate::error::AppError;
use session_manager_api::{
    LoginRequest, LogoutAllResponse, LogoutResponse, RefreshRequest, RegisterRequest,
    SessionResponse, UserResponse,
};

/// User-agent and origin IP, captured for the token record. The first
/// entry of `X-Forwarded-For` is the client as seen by the edge.
fn client_context(headers: &HeaderMap) -> ClientContext {
    let user_agent = headers
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string());

    ClientContext {
        user_agent,
        ip_address,
    }
}

/// POST /auth/register
pub async fn register(
    State(service): State<Arc<SessionService>>,
    headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let session = service.register(&payload, &client_context(&headers))?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /auth/login
pub async fn login(
    State(service): State<Arc<SessionService>>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = service.login(&payload, &client_context(&headers))?;
    Ok(Json(session))
}

/// POST /auth/refresh
/// Exchanges a single-use refresh secret for the next one in its chain.
pub async fn refresh(
    State(service): State<Arc<SessionService>>,
    headers: HeaderMap,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = service.refresh(&payload.refresh_token, &client_context(&headers))?;
    Ok(Json(session))
}

/// POST /auth/logout
/// Revokes the presented refresh secret. No access token required: the
/// secret itself is the proof of possession.
pub async fn logout(
    State(service): State<Arc<SessionService>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<LogoutResponse>, AppError> {
    service.logout(&payload.refresh_token)?;
    Ok(Json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// POST /auth/logout-all
/// Revokes every live refresh token of the authenticated user.
pub async fn logout_all(
    claims: AuthClaims,
    Extension(service): Extension<Arc<SessionService>>,
) -> Result<Json<LogoutAllResponse>, AppError> {
    let response = service.logout_all(claims.sub)?;
    Ok(Json(response))
}

/// GET /auth/me
pub async fn get_current_user(
    claims: AuthClaims,
    Extension(service): Extension<Arc<SessionService>>,
) -> Result<Json<UserResponse>, AppError> {
    let user = service.current_user(claims.sub)?;
    Ok(Json(user))
}
