use crate::auth::store::TokenStore;
use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::refresh_token::{NewRefreshToken, RefreshToken, RevokedReason};
use crate::db::schema::refresh_tokens;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Postgres-backed [`TokenStore`]. Each mutation is a single statement,
/// so atomicity comes from the database; no cross-record transaction is
/// needed.
pub struct RefreshTokenRepository;

impl TokenStore for RefreshTokenRepository {
    fn create(&self, record: &NewRefreshToken) -> Result<RefreshToken, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::insert_into(refresh_tokens::table)
            .values(record)
            .get_result::<RefreshToken>(&mut conn)
            .map_err(Into::into)
    }

    fn find_live_by_secret(&self, secret: &str) -> Result<Option<RefreshToken>, RepositoryError> {
        let mut conn = get_connection()?;

        // Deliberately no filter on `used` or `expires_at`: the engine
        // classifies those states itself.
        refresh_tokens::table
            .filter(refresh_tokens::secret.eq(secret))
            .filter(refresh_tokens::revoked.eq(false))
            .first::<RefreshToken>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    fn mark_used(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut conn = get_connection()?;

        // Conditional update: of N concurrent redeemers exactly one sees
        // a row count of 1 here.
        let updated = diesel::update(
            refresh_tokens::table
                .filter(refresh_tokens::id.eq(id))
                .filter(refresh_tokens::used.eq(false)),
        )
        .set(refresh_tokens::used.eq(true))
        .execute(&mut conn)?;

        Ok(updated == 1)
    }

    fn revoke_by_id(&self, id: Uuid, reason: RevokedReason) -> Result<usize, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(
            refresh_tokens::table
                .filter(refresh_tokens::id.eq(id))
                .filter(refresh_tokens::revoked.eq(false)),
        )
        .set((
            refresh_tokens::revoked.eq(true),
            refresh_tokens::revoked_reason.eq(reason.as_str()),
        ))
        .execute(&mut conn)
        .map_err(Into::into)
    }

    fn revoke_by_family(
        &self,
        family: &str,
        reason: RevokedReason,
    ) -> Result<usize, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(
            refresh_tokens::table
                .filter(refresh_tokens::family.eq(family))
                .filter(refresh_tokens::revoked.eq(false)),
        )
        .set((
            refresh_tokens::revoked.eq(true),
            refresh_tokens::revoked_reason.eq(reason.as_str()),
        ))
        .execute(&mut conn)
        .map_err(Into::into)
    }

    fn revoke_by_user(
        &self,
        user_id: Uuid,
        reason: RevokedReason,
    ) -> Result<usize, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(
            refresh_tokens::table
                .filter(refresh_tokens::user_id.eq(user_id))
                .filter(refresh_tokens::revoked.eq(false)),
        )
        .set((
            refresh_tokens::revoked.eq(true),
            refresh_tokens::revoked_reason.eq(reason.as_str()),
        ))
        .execute(&mut conn)
        .map_err(Into::into)
    }

    fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(
            refresh_tokens::table
                .filter(refresh_tokens::expires_at.lt(now))
                .filter(refresh_tokens::used.eq(false))
                .filter(refresh_tokens::revoked.eq(false)),
        )
        .set((
            refresh_tokens::revoked.eq(true),
            refresh_tokens::revoked_reason.eq(RevokedReason::Expired.as_str()),
        ))
        .execute(&mut conn)
        .map_err(Into::into)
    }
}
