//! Concrete authentication backend
//!
//! Implements the boundary this service needs from the external auth
//! system: given request headers, return `{user, session}` or nothing.
//!
//! Domain states expose this via `FromRef`:
//! ```ignore
//! impl FromRef<MyDomainState> for SessionBackend {
//!     fn from_ref(state: &MyDomainState) -> Self {
//!         state.sessions.clone()
//!     }
//! }
//! ```

use std::sync::Arc;

use axum::http::HeaderMap;
use sqlx::PgPool;

use crate::context::AuthContext;
use crate::error::AuthError;
use crate::store::{PgSessionStore, SessionStore};
use crate::token::session_token_from_headers;

#[derive(Clone)]
pub struct SessionBackend {
    store: Arc<dyn SessionStore>,
}

impl SessionBackend {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Backend over the shared PostgreSQL pool
    pub fn postgres(pool: PgPool) -> Self {
        Self::new(Arc::new(PgSessionStore::new(pool)))
    }

    /// Resolve the request's session, rejecting missing, unknown and
    /// expired tokens alike.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let token = session_token_from_headers(headers).ok_or(AuthError::MissingSession)?;

        let (user, session) = self
            .store
            .resolve(&token)
            .await?
            .ok_or(AuthError::UnknownSession)?;

        if session.is_expired() {
            tracing::debug!(session_id = %session.id, "Rejected expired session");
            return Err(AuthError::ExpiredSession);
        }

        Ok(AuthContext::new(user, session))
    }
}
