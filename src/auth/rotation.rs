use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::auth::factory::TokenFactory;
use crate::auth::store::TokenStore;
use crate::db::error::RepositoryError;
use crate::db::models::refresh_token::{NewRefreshToken, RefreshToken, RevokedReason};

/// User-agent / origin-IP metadata captured at issuance. Informational
/// only; never consulted by the protocol.
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// A freshly issued link in a rotation chain. `secret` is the only copy
/// of the plaintext; it is not retrievable again.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub record: RefreshToken,
    pub secret: String,
}

/// Typed outcomes of the state machine. Storage failures are kept apart
/// from protocol outcomes so callers can never mistake an outage for an
/// expiry or a reuse signal.
#[derive(Debug, thiserror::Error)]
pub enum RotationError {
    #[error("Invalid refresh token")]
    InvalidToken,
    #[error("Refresh token expired")]
    ExpiredToken,
    #[error("Refresh token reuse detected")]
    ReuseDetected,
    #[error("Token store error: {0}")]
    Store(#[from] RepositoryError),
}

/// The rotation state machine. A token moves `Fresh -> Redeemed` on the
/// one successful redemption, or `Fresh -> Revoked` via logout, expiry or
/// breach; there is no transition out of `Revoked`.
///
/// Holds no mutable state of its own: every instance (and every replica
/// of the service) coordinates purely through the injected store.
pub struct RotationEngine {
    store: Arc<dyn TokenStore>,
    refresh_ttl: Duration,
}

impl RotationEngine {
    pub fn new(store: Arc<dyn TokenStore>, refresh_ttl: Duration) -> Self {
        Self { store, refresh_ttl }
    }

    /// Creates a `Fresh` record. Without a family this starts a new chain
    /// (login/registration); with one it extends an existing chain during
    /// rotation.
    pub fn issue(
        &self,
        user_id: Uuid,
        family: Option<&str>,
        ctx: &ClientContext,
    ) -> Result<IssuedToken, RotationError> {
        let secret = TokenFactory::new_refresh_secret();
        let family = family.map_or_else(TokenFactory::new_family_id, str::to_string);
        let now = Utc::now();

        let record = self.store.create(&NewRefreshToken {
            user_id,
            secret: secret.clone(),
            family,
            issued_at: now,
            expires_at: now + self.refresh_ttl,
            user_agent: ctx.user_agent.clone(),
            ip_address: ctx.ip_address.clone(),
        })?;

        Ok(IssuedToken { record, secret })
    }

    /// Redeems a presented secret for the next link in its chain.
    ///
    /// A secret that has already been redeemed once is treated as a theft
    /// signal: the entire family is revoked, including the legitimate
    /// holder's current token, forcing re-authentication. The used-flag
    /// check and the transition are one conditional update in the store,
    /// so of N concurrent redeemers exactly one succeeds and the rest
    /// land here on the reuse branch.
    pub fn redeem(
        &self,
        presented_secret: &str,
        ctx: &ClientContext,
    ) -> Result<IssuedToken, RotationError> {
        let record = self
            .store
            .find_live_by_secret(presented_secret)?
            .ok_or(RotationError::InvalidToken)?;

        // Expiry first: a stale token must never read as a breach.
        if record.is_expired(Utc::now()) {
            self.store.revoke_by_id(record.id, RevokedReason::Expired)?;
            return Err(RotationError::ExpiredToken);
        }

        if !self.store.mark_used(record.id)? {
            let revoked = self
                .store
                .revoke_by_family(&record.family, RevokedReason::ReuseDetected)?;
            tracing::warn!(
                user_id = %record.user_id,
                family = %record.family,
                revoked,
                "refresh token reuse detected, rotation chain revoked"
            );
            return Err(RotationError::ReuseDetected);
        }

        self.issue(record.user_id, Some(&record.family), ctx)
    }

    /// Revokes the single record matching `secret`. A no-op for unknown
    /// or already-revoked secrets.
    pub fn revoke_one(&self, secret: &str, reason: RevokedReason) -> Result<(), RotationError> {
        if let Some(record) = self.store.find_live_by_secret(secret)? {
            self.store.revoke_by_id(record.id, reason)?;
        }
        Ok(())
    }

    pub fn revoke_family(
        &self,
        family: &str,
        reason: RevokedReason,
    ) -> Result<usize, RotationError> {
        Ok(self.store.revoke_by_family(family, reason)?)
    }

    pub fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        reason: RevokedReason,
    ) -> Result<usize, RotationError> {
        Ok(self.store.revoke_by_user(user_id, reason)?)
    }

    /// Maintenance pass: revokes unused-but-expired records so they stop
    /// showing up as live. Redemption enforces expiry on its own; this
    /// only keeps diagnostics honest.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, RotationError> {
        Ok(self.store.sweep_expired(now)?)
    }
}
