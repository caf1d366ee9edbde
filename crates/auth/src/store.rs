//! Session lookup backends
//!
//! The external auth system writes `users`/`sessions`; this service only
//! reads them. Uses runtime `sqlx::query_as` (not macros) so the crate
//! compiles without a live database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AuthError;
use crate::types::{AuthSession, AuthUser};

/// Resolves an opaque session token to its user + session pair.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Option<(AuthUser, AuthSession)>, AuthError>;
}

/// Row type for the session-with-user join
#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: Uuid,
    token: String,
    expires_at: DateTime<Utc>,
    user_id: Uuid,
    name: String,
    email: String,
}

/// PostgreSQL-backed session lookup.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SessionStore for PgSessionStore {
    async fn resolve(&self, token: &str) -> Result<Option<(AuthUser, AuthSession)>, AuthError> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT s.id AS session_id, s.token, s.expires_at,
                   u.id AS user_id, u.name, u.email
            FROM sessions s
            INNER JOIN users u ON u.id = s.user_id
            WHERE s.token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to load session");
            AuthError::SessionLoadError
        })?;

        Ok(row.map(|r| {
            (
                AuthUser {
                    id: r.user_id,
                    name: r.name,
                    email: r.email,
                },
                AuthSession {
                    id: r.session_id,
                    user_id: r.user_id,
                    token: r.token,
                    expires_at: r.expires_at,
                },
            )
        }))
    }
}

/// In-memory session store for tests and local development.
/// Thread-safe via `Arc<Mutex<>>`.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<Mutex<HashMap<String, (AuthUser, AuthSession)>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session for `user` under `token`, returning the session.
    pub fn register(
        &self,
        user: AuthUser,
        token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> AuthSession {
        let token = token.into();
        let session = AuthSession {
            id: Uuid::new_v4(),
            user_id: user.id,
            token: token.clone(),
            expires_at,
        };
        self.sessions
            .lock()
            .expect("sessions lock poisoned - a previous test panicked")
            .insert(token, (user, session.clone()));
        session
    }

    /// Drop a session, as an external sign-out would.
    pub fn revoke(&self, token: &str) {
        self.sessions
            .lock()
            .expect("sessions lock poisoned - a previous test panicked")
            .remove(token);
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn resolve(&self, token: &str) -> Result<Option<(AuthUser, AuthSession)>, AuthError> {
        Ok(self
            .sessions
            .lock()
            .map_err(|_| AuthError::SessionLoadError)?
            .get(token)
            .cloned())
    }
}
