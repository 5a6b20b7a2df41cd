use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Returned by register, login and refresh alike: a fresh access token
/// plus the single-use refresh secret that starts (or extends) a rotation
/// chain. The refresh secret is shown exactly once.
#[derive(Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LogoutResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LogoutAllResponse {
    pub revoked_count: usize,
}
