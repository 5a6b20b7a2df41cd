use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::error::RepositoryError;
use crate::db::models::refresh_token::{NewRefreshToken, RefreshToken, RevokedReason};
use crate::db::models::user::{NewUser, User};

/// Storage interface the rotation engine runs against.
///
/// The engine is the only writer of the `used`/`revoked` flags; the store
/// never mutates state on its own initiative apart from `sweep_expired`.
/// Implementations must make `mark_used` an atomic conditional update
/// ("set used=true where id=? and used=false") so that two concurrent
/// redemptions of the same secret can never both observe `used=false`.
pub trait TokenStore: Send + Sync {
    fn create(&self, record: &NewRefreshToken) -> Result<RefreshToken, RepositoryError>;

    /// Look up a record by its secret, excluding revoked records only.
    /// Used and expired records are still returned: the engine needs them
    /// to tell reuse apart from expiry.
    fn find_live_by_secret(&self, secret: &str) -> Result<Option<RefreshToken>, RepositoryError>;

    /// Transition `used: false -> true`. Returns `true` iff this caller
    /// performed the transition (the record was still unused).
    fn mark_used(&self, id: Uuid) -> Result<bool, RepositoryError>;

    /// Revocations only touch records with `revoked = false`, so the first
    /// recorded reason is never overwritten and repeat calls are no-ops.
    /// Each returns the number of records newly revoked.
    fn revoke_by_id(&self, id: Uuid, reason: RevokedReason) -> Result<usize, RepositoryError>;
    fn revoke_by_family(
        &self,
        family: &str,
        reason: RevokedReason,
    ) -> Result<usize, RepositoryError>;
    fn revoke_by_user(
        &self,
        user_id: Uuid,
        reason: RevokedReason,
    ) -> Result<usize, RepositoryError>;

    /// Revoke every unused, unrevoked record whose expiry has passed.
    fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, RepositoryError>;
}

/// The external user-credential store, seen only at its interface
/// boundary. Password verification itself lives in `auth::password`.
pub trait CredentialStore: Send + Sync {
    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;
    fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError>;
}
