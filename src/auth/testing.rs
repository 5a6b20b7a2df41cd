//! In-memory store implementations for tests. A single mutex per store
//! gives the same atomicity the SQL conditional updates provide, so the
//! engine's concurrency contract can be exercised without Postgres.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::auth::store::{CredentialStore, TokenStore};
use crate::db::error::RepositoryError;
use crate::db::models::refresh_token::{NewRefreshToken, RefreshToken, RevokedReason};
use crate::db::models::user::{NewUser, User};

#[derive(Default)]
pub struct MemoryTokenStore {
    records: Mutex<Vec<RefreshToken>>,
}

impl MemoryTokenStore {
    /// Backdates a record far past its expiry.
    pub fn force_expire(&self, secret: &str) {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.secret == secret)
            .expect("no record with that secret");
        record.expires_at = Utc::now() - Duration::hours(1);
    }

    pub fn count_revoked_with_reason(&self, family: &str, reason: &str) -> usize {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.family == family && r.revoked && r.revoked_reason.as_deref() == Some(reason)
            })
            .count()
    }

    pub fn live_count_for_user(&self, user_id: Uuid) -> usize {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id && !r.revoked)
            .count()
    }
}

impl TokenStore for MemoryTokenStore {
    fn create(&self, record: &NewRefreshToken) -> Result<RefreshToken, RepositoryError> {
        let token = RefreshToken {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            secret: record.secret.clone(),
            family: record.family.clone(),
            issued_at: record.issued_at,
            expires_at: record.expires_at,
            used: false,
            revoked: false,
            revoked_reason: None,
            user_agent: record.user_agent.clone(),
            ip_address: record.ip_address.clone(),
        };
        self.records.lock().unwrap().push(token.clone());
        Ok(token)
    }

    fn find_live_by_secret(&self, secret: &str) -> Result<Option<RefreshToken>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.secret == secret && !r.revoked)
            .cloned())
    }

    fn mark_used(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| r.id == id && !r.used) {
            Some(record) => {
                record.used = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn revoke_by_id(&self, id: Uuid, reason: RevokedReason) -> Result<usize, RepositoryError> {
        Ok(revoke_where(
            &mut self.records.lock().unwrap(),
            reason,
            |r| r.id == id,
        ))
    }

    fn revoke_by_family(
        &self,
        family: &str,
        reason: RevokedReason,
    ) -> Result<usize, RepositoryError> {
        Ok(revoke_where(
            &mut self.records.lock().unwrap(),
            reason,
            |r| r.family == family,
        ))
    }

    fn revoke_by_user(
        &self,
        user_id: Uuid,
        reason: RevokedReason,
    ) -> Result<usize, RepositoryError> {
        Ok(revoke_where(
            &mut self.records.lock().unwrap(),
            reason,
            |r| r.user_id == user_id,
        ))
    }

    fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, RepositoryError> {
        Ok(revoke_where(
            &mut self.records.lock().unwrap(),
            RevokedReason::Expired,
            |r| !r.used && r.expires_at < now,
        ))
    }
}

fn revoke_where(
    records: &mut [RefreshToken],
    reason: RevokedReason,
    predicate: impl Fn(&RefreshToken) -> bool,
) -> usize {
    let mut revoked = 0;
    for record in records.iter_mut().filter(|r| !r.revoked) {
        if predicate(record) {
            record.revoked = true;
            record.revoked_reason = Some(reason.as_str().to_string());
            revoked += 1;
        }
    }
    revoked
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Mutex<Vec<User>>,
}

impl MemoryCredentialStore {
    pub fn remove(&self, id: Uuid) {
        self.users.lock().unwrap().retain(|u| u.id != id);
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(RepositoryError::UniqueViolation(
                "users_email_key".to_string(),
            ));
        }
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            role: new_user.role.clone(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }
}
