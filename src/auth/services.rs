use std::sync::Arc;

use chrono::{Duration, Utc};
use session_manager_api::{
    LoginRequest, LogoutAllResponse, RegisterRequest, SessionResponse, UserResponse,
};
use uuid::Uuid;

use crate::auth::jwt::JwtManager;
use crate::auth::rotation::{ClientContext, RotationEngine};
use crate::auth::store::{CredentialStore, TokenStore};
use crate::db::models::refresh_token::RevokedReason;
use crate::db::models::user::{NewUser, User};
use crate::error::AppError;

const DEFAULT_ROLE: &str = "user";

/// Orchestrates login/register/logout against the rotation engine and
/// the external credential store, and translates engine outcomes into
/// transport responses.
pub struct SessionService {
    engine: RotationEngine,
    users: Arc<dyn CredentialStore>,
    jwt: JwtManager,
}

impl SessionService {
    pub fn new(
        tokens: Arc<dyn TokenStore>,
        users: Arc<dyn CredentialStore>,
        jwt: JwtManager,
        refresh_ttl_days: i64,
    ) -> Self {
        Self {
            engine: RotationEngine::new(tokens, Duration::days(refresh_ttl_days)),
            users,
            jwt,
        }
    }

    /// Creates the account, then opens a new rotation chain for it.
    pub fn register(
        &self,
        request: &RegisterRequest,
        ctx: &ClientContext,
    ) -> Result<SessionResponse, AppError> {
        if self.users.find_by_email(&request.email)?.is_some() {
            return Err(AppError::EmailInUse);
        }

        let password_hash = super::password::PasswordManager::hash(&request.password)?;
        let user = self.users.create(&NewUser {
            name: request.name.clone(),
            email: request.email.clone(),
            password_hash,
            role: DEFAULT_ROLE.to_string(),
        })?;

        tracing::info!(user_id = %user.id, "user registered");
        self.open_session(user, ctx)
    }

    /// Checks credentials and opens a new rotation chain. A uniform
    /// `InvalidCredentials` covers both unknown email and bad password.
    pub fn login(
        &self,
        request: &LoginRequest,
        ctx: &ClientContext,
    ) -> Result<SessionResponse, AppError> {
        let Some(user) = self.users.find_by_email(&request.email)? else {
            return Err(AppError::InvalidCredentials);
        };

        if !super::password::PasswordManager::verify(&request.password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        self.open_session(user, ctx)
    }

    /// Exchanges a refresh secret for the next link in its chain plus a
    /// fresh access token. `ReuseDetected` passes through untouched so
    /// the transport layer can force a full re-login.
    pub fn refresh(
        &self,
        presented_secret: &str,
        ctx: &ClientContext,
    ) -> Result<SessionResponse, AppError> {
        let rotated = self.engine.redeem(presented_secret, ctx)?;

        let Some(user) = self.users.find_by_id(rotated.record.user_id)? else {
            // Account is gone; the chain has no owner anymore.
            self.engine
                .revoke_family(&rotated.record.family, RevokedReason::UserDeleted)?;
            return Err(AppError::InvalidToken);
        };

        let access_token = self.jwt.sign_access_token(user.id, &user.role)?;
        Ok(SessionResponse {
            access_token,
            refresh_token: rotated.secret,
            expires_in: self.jwt.ttl_seconds(),
            user: user.into(),
        })
    }

    /// Revokes the presented secret's record. Idempotent.
    pub fn logout(&self, presented_secret: &str) -> Result<(), AppError> {
        self.engine
            .revoke_one(presented_secret, RevokedReason::ManualLogout)?;
        Ok(())
    }

    /// Revokes every live token the user holds, across all chains.
    pub fn logout_all(&self, user_id: Uuid) -> Result<LogoutAllResponse, AppError> {
        let revoked_count = self
            .engine
            .revoke_all_for_user(user_id, RevokedReason::ManualLogout)?;
        tracing::info!(%user_id, revoked_count, "logged out everywhere");
        Ok(LogoutAllResponse { revoked_count })
    }

    pub fn current_user(&self, user_id: Uuid) -> Result<UserResponse, AppError> {
        self.users
            .find_by_id(user_id)?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    pub fn sweep_expired(&self) -> Result<usize, AppError> {
        Ok(self.engine.sweep_expired(Utc::now())?)
    }

    fn open_session(&self, user: User, ctx: &ClientContext) -> Result<SessionResponse, AppError> {
        let issued = self.engine.issue(user.id, None, ctx)?;
        let access_token = self.jwt.sign_access_token(user.id, &user.role)?;

        Ok(SessionResponse {
            access_token,
            refresh_token: issued.secret,
            expires_in: self.jwt.ttl_seconds(),
            user: user.into(),
        })
    }
}
