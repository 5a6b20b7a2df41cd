use axum::{
    Router,
    extract::Extension,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::jwt::JwtManager;
use crate::auth::services::SessionService;
use crate::handlers::auth::{get_current_user, login, logout, logout_all, refresh, register};
use crate::handlers::health::health;

/// Session endpoints. Public routes carry the service as state; the
/// protected ones take `JwtManager` as state for the `AuthClaims`
/// extractor and receive the service by extension.
pub fn auth_routes(service: Arc<SessionService>, jwt_manager: JwtManager) -> Router {
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .with_state(service.clone());

    let protected = Router::new()
        .route("/logout-all", post(logout_all))
        .route("/me", get(get_current_user))
        .with_state(jwt_manager)
        .layer(Extension(service));

    public.merge(protected)
}

/// Builds the complete application router.
pub fn build_router(service: Arc<SessionService>, jwt_manager: JwtManager) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes(service, jwt_manager))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
