//! Common test utilities and fixtures for integration tests
//!
//! Builds the real router over in-memory stores and the mock model, and
//! provides user fixtures with live session tokens.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use axum::Router;
use chrono::{DateTime, Duration, Utc};
use threadline_auth::{AuthUser, MemorySessionStore, SessionBackend};
use threadline_conversations::{
    ChatState, Conversation, ConversationStore, MemoryConversationStore, Message,
};
use threadline_llm::mock::MockLlmService;
use uuid::Uuid;

/// Model name wired into every test router
pub const TEST_MODEL: &str = "test-model";

/// Test application over in-memory stores.
///
/// The store, session and model handles are shared with the router, so
/// tests can seed data and inspect side effects directly.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryConversationStore>,
    pub sessions: Arc<MemorySessionStore>,
    pub llm: Arc<MockLlmService>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_llm(MockLlmService::new())
    }

    /// Build the app around a preconfigured mock model.
    pub fn with_llm(llm: MockLlmService) -> Self {
        let store = Arc::new(MemoryConversationStore::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let llm = Arc::new(llm);

        let state = ChatState::new(
            store.clone(),
            SessionBackend::new(sessions.clone()),
            llm.clone(),
            TEST_MODEL.to_string(),
        );

        Self {
            router: threadline_app::router_with_state(state),
            store,
            sessions,
            llm,
        }
    }

    /// Fresh router handle for a `oneshot` call
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Register a user with a session valid for one hour.
    pub fn login(&self, name: &str) -> UserFixture {
        let user = AuthUser {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@threadline.test", name.to_lowercase().replace(' ', ".")),
        };
        let token = format!("tok_{}", Uuid::new_v4().simple());
        self.sessions
            .register(user.clone(), token.clone(), Utc::now() + Duration::hours(1));

        UserFixture { user, token }
    }

    /// Insert a conversation for `owner_id` directly into the store.
    pub async fn seed_conversation(&self, owner_id: Uuid, title: &str) -> Conversation {
        self.seed_conversation_at(owner_id, title, Utc::now()).await
    }

    /// Insert a conversation with an explicit creation time, for tests
    /// that assert ordering.
    pub async fn seed_conversation_at(
        &self,
        owner_id: Uuid,
        title: &str,
        created_at: DateTime<Utc>,
    ) -> Conversation {
        let mut conversation = Conversation::new(owner_id, title.to_string()).unwrap();
        conversation.created_at = created_at;
        self.store.create(&conversation).await.unwrap()
    }

    /// Insert a completed user/assistant turn for an existing conversation.
    pub async fn seed_turn(&self, conversation_id: Uuid, prompt: &str, reply: &str) {
        let (user, assistant) =
            Message::turn_pair(conversation_id, prompt.to_string(), reply.to_string());
        self.store.append_turn(&user, &assistant).await.unwrap();
    }
}

/// A registered user plus the session token that authenticates them
#[derive(Debug, Clone)]
pub struct UserFixture {
    pub user: AuthUser,
    pub token: String,
}

impl UserFixture {
    /// Value for the request's `authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Poll `condition` until it holds, panicking after one second.
///
/// The chat endpoint persists messages from a background task after the
/// response body completes, so tests wait for the store to catch up.
pub async fn eventually(mut condition: impl FnMut() -> bool, what: &str) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(StdDuration::from_millis(10)).await;
    }
    panic!("condition not reached within 1s: {what}");
}
