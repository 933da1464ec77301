use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::SurveyorResult;
use crate::types::{Interest, Message, Session, SessionId};

/// What the service hands back when a session is started
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedSession {
    pub session_id: SessionId,
    /// The agent's greeting, first entry of the new transcript
    pub initial_message: String,
}

/// Server-side status of a single session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStatus {
    pub paused: bool,
}

/// The remote session/message/interest service, as consumed by the controller.
///
/// Implementations are stateless from the caller's point of view: every call is an
/// independent request/response exchange.
#[async_trait]
pub trait SessionService: Send + Sync + Debug {
    /// List every live session
    async fn list_sessions(&self) -> SurveyorResult<Vec<Session>>;

    /// Start a new session for `prompt`
    async fn create_session(&self, prompt: &str, consent: bool) -> SurveyorResult<CreatedSession>;

    /// Fetch the status flags of one session
    async fn fetch_session(&self, id: &SessionId) -> SurveyorResult<SessionStatus>;

    /// Fetch the session's message log, oldest first
    async fn fetch_messages(&self, id: &SessionId) -> SurveyorResult<Vec<Message>>;

    /// Send a user message and return the agent's reply
    async fn send_message(&self, id: &SessionId, message: &str) -> SurveyorResult<String>;

    /// Fetch the current interest ranking, best first
    async fn fetch_interests(&self, id: &SessionId) -> SurveyorResult<Vec<Interest>>;

    async fn pause(&self, id: &SessionId) -> SurveyorResult<()>;

    async fn resume(&self, id: &SessionId) -> SurveyorResult<()>;

    /// Permanently delete a session and its data
    async fn delete_session(&self, id: &SessionId) -> SurveyorResult<()>;
}

/// Type alias for Arc-wrapped SessionService trait objects
pub type SessionServiceRef = Arc<dyn SessionService>;
