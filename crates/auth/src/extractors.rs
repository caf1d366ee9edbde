//! Axum extractors for authentication
//!
//! Generic over any state `S` where `SessionBackend: FromRef<S>`.
//! This is axum's idiomatic nested-state pattern.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::backend::SessionBackend;
use crate::context::AuthContext;
use crate::error::AuthError;

/// Authenticated user extractor: both user and session must resolve,
/// anything else is a 401.
#[derive(Debug)]
pub struct CurrentUser(pub AuthContext);

impl<S> FromRequestParts<S> for CurrentUser
where
    SessionBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let backend = SessionBackend::from_ref(state);
        let auth_context = backend.authenticate(&parts.headers).await?;

        Ok(CurrentUser(auth_context))
    }
}
