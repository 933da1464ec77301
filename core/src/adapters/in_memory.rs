use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::{SurveyorError, SurveyorResult};
use crate::service::{CreatedSession, SessionService, SessionStatus};
use crate::types::{Interest, Message, Session, SessionId};

#[derive(Debug, Clone)]
struct StoredSession {
    prompt: String,
    paused: bool,
    deleted: bool,
    messages: Vec<Message>,
    interests: Vec<Interest>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    sessions: BTreeMap<u64, StoredSession>,
}

/// In-memory implementation of SessionService.
///
/// Mirrors what the HTTP service does: integer ids handed out in order, the opening
/// prompt and the greeting both land in the message log, sending to a paused session is
/// refused, and deleting a session hides it and clears its messages.
#[derive(Debug, Clone)]
pub struct InMemorySessionService {
    inner: Arc<RwLock<Inner>>,
    history_limit: usize,
}

impl Default for InMemorySessionService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionService {
    pub fn new() -> Self {
        Self::with_history_limit(crate::config::DEFAULT_MESSAGE_HISTORY_LIMIT as usize)
    }

    pub fn with_history_limit(history_limit: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                next_id: 1,
                sessions: BTreeMap::new(),
            })),
            history_limit,
        }
    }

    /// Install the interest ranking the service would have inferred for a session
    pub fn set_interests(&self, id: &SessionId, mut interests: Vec<Interest>) -> SurveyorResult<()> {
        interests.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        self.with_live_session(id, |session| {
            session.interests = interests;
            Ok(())
        })
    }

    fn greeting(prompt: &str) -> String {
        format!(
            "Hi there! I'd love to learn what you enjoy about {}. What got you interested?",
            prompt
        )
    }

    fn reply(message: &str) -> String {
        format!("Thanks for sharing that you said \"{}\". What else comes to mind?", message)
    }

    fn parse_id(id: &SessionId) -> SurveyorResult<u64> {
        id.as_str()
            .parse::<u64>()
            .map_err(|_| SurveyorError::NotFound(id.to_string()))
    }

    fn read<T>(&self, f: impl FnOnce(&Inner) -> SurveyorResult<T>) -> SurveyorResult<T> {
        let inner = self.inner.read().map_err(|e| {
            SurveyorError::StorageError(format!("Failed to acquire read lock: {}", e))
        })?;
        f(&inner)
    }

    fn write<T>(&self, f: impl FnOnce(&mut Inner) -> SurveyorResult<T>) -> SurveyorResult<T> {
        let mut inner = self.inner.write().map_err(|e| {
            SurveyorError::StorageError(format!("Failed to acquire write lock: {}", e))
        })?;
        f(&mut inner)
    }

    fn with_live_session<T>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut StoredSession) -> SurveyorResult<T>,
    ) -> SurveyorResult<T> {
        let key = Self::parse_id(id)?;
        self.write(|inner| match inner.sessions.get_mut(&key) {
            Some(session) if !session.deleted => f(session),
            _ => Err(SurveyorError::NotFound(id.to_string())),
        })
    }
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn list_sessions(&self) -> SurveyorResult<Vec<Session>> {
        self.read(|inner| {
            let sessions: Vec<Session> = inner
                .sessions
                .iter()
                .filter(|(_, s)| !s.deleted)
                .map(|(id, s)| Session {
                    id: SessionId::from(*id),
                    prompt: s.prompt.clone(),
                    paused: s.paused,
                })
                .collect();
            debug!("Listed {} sessions", sessions.len());
            Ok(sessions)
        })
    }

    async fn create_session(&self, prompt: &str, consent: bool) -> SurveyorResult<CreatedSession> {
        if prompt.trim().is_empty() {
            return Err(SurveyorError::EmptyPrompt);
        }
        if !consent {
            return Err(SurveyorError::ConsentRequired);
        }

        let greeting = Self::greeting(prompt);
        let id = self.write(|inner| {
            let id = inner.next_id;
            inner.next_id += 1;
            inner.sessions.insert(
                id,
                StoredSession {
                    prompt: prompt.to_string(),
                    paused: false,
                    deleted: false,
                    messages: vec![Message::user(prompt), Message::agent(greeting.clone())],
                    interests: Vec::new(),
                },
            );
            Ok(id)
        })?;

        debug!("Created session: {}", id);
        Ok(CreatedSession {
            session_id: SessionId::from(id),
            initial_message: greeting,
        })
    }

    async fn fetch_session(&self, id: &SessionId) -> SurveyorResult<SessionStatus> {
        // A soft-deleted session is still addressable here, like on the real service
        let key = Self::parse_id(id)?;
        self.read(|inner| {
            inner
                .sessions
                .get(&key)
                .map(|s| SessionStatus { paused: s.paused })
                .ok_or_else(|| SurveyorError::NotFound(id.to_string()))
        })
    }

    async fn fetch_messages(&self, id: &SessionId) -> SurveyorResult<Vec<Message>> {
        let Ok(key) = Self::parse_id(id) else {
            return Ok(Vec::new());
        };
        let limit = self.history_limit;
        self.read(|inner| {
            let messages = inner
                .sessions
                .get(&key)
                .map(|s| {
                    // Window first, then drop blanks, so fewer than `limit` may come back
                    let skip = s.messages.len().saturating_sub(limit);
                    s.messages
                        .iter()
                        .skip(skip)
                        .filter(|m| !m.content.trim().is_empty())
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            Ok(messages)
        })
    }

    async fn send_message(&self, id: &SessionId, message: &str) -> SurveyorResult<String> {
        let reply = Self::reply(message);
        self.with_live_session(id, |session| {
            if session.paused {
                warn!("Refusing message for paused session {}", id);
                return Err(SurveyorError::NotFound(format!("{} (paused)", id)));
            }
            session.messages.push(Message::user(message));
            session.messages.push(Message::agent(reply.clone()));
            Ok(())
        })?;
        Ok(reply)
    }

    async fn fetch_interests(&self, id: &SessionId) -> SurveyorResult<Vec<Interest>> {
        let Ok(key) = Self::parse_id(id) else {
            return Ok(Vec::new());
        };
        self.read(|inner| {
            Ok(inner
                .sessions
                .get(&key)
                .filter(|s| !s.deleted)
                .map(|s| s.interests.clone())
                .unwrap_or_default())
        })
    }

    async fn pause(&self, id: &SessionId) -> SurveyorResult<()> {
        set_paused(self, id, true)
    }

    async fn resume(&self, id: &SessionId) -> SurveyorResult<()> {
        set_paused(self, id, false)
    }

    async fn delete_session(&self, id: &SessionId) -> SurveyorResult<()> {
        self.with_live_session(id, |session| {
            session.deleted = true;
            session.messages.clear();
            session.interests.clear();
            Ok(())
        })?;
        debug!("Deleted session: {}", id);
        Ok(())
    }
}

// Pause and resume acknowledge unknown ids, matching the service
fn set_paused(service: &InMemorySessionService, id: &SessionId, paused: bool) -> SurveyorResult<()> {
    match service.with_live_session(id, |session| {
        session.paused = paused;
        Ok(())
    }) {
        Err(e) if e.is_not_found() => Ok(()),
        other => other,
    }
}
