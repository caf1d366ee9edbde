//! Authenticated request context

use uuid::Uuid;

use crate::types::{AuthSession, AuthUser};

/// Identity threaded through a request: both halves must be present,
/// set once at the boundary and passed down explicitly.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: AuthUser,
    pub session: AuthSession,
}

impl AuthContext {
    pub fn new(user: AuthUser, session: AuthSession) -> Self {
        Self { user, session }
    }

    /// Owner id used to scope every store operation
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }
}
