//! Session read-model types
//!
//! Lightweight views of the user/session rows owned by the external
//! auth system. These carry only the fields request handling needs.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Authenticated user as seen by this service.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// An issued session. Sessions are opaque bearer tokens with an expiry;
/// issuance and renewal happen outside this service.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
