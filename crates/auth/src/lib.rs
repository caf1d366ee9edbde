//! Session resolution for the Threadline API
//!
//! The external auth system issues sessions; this crate answers one
//! question for the request path: given request headers, return
//! `{user, session}` or nothing. Provides the lookup backends and an
//! axum extractor that works with any domain state implementing
//! `FromRef<S>` for `SessionBackend`.

mod backend;
mod context;
mod error;
mod extractors;
mod store;
mod token;
mod types;

pub use backend::SessionBackend;
pub use context::AuthContext;
pub use error::AuthError;
pub use extractors::CurrentUser;
pub use store::{MemorySessionStore, PgSessionStore, SessionStore};
pub use types::{AuthSession, AuthUser};
