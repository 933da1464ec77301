#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use surveyor_cli::{Confirmer, SessionController};
use surveyor_core::adapters::InMemorySessionService;
use surveyor_core::{
    CreatedSession, Interest, Message, Session, SessionId, SessionService, SessionStatus,
    SurveyorError, SurveyorResult,
};
use tokio::sync::Notify;

pub const PERIOD: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Create,
    FetchSession,
    FetchMessages,
    Send,
    FetchInterests,
    Pause,
    Resume,
    Delete,
}

/// Wraps the in-memory service: records every call, fails on demand and can hold
/// interest responses back to simulate a slow service.
#[derive(Debug, Default)]
pub struct ScriptedService {
    inner: InMemorySessionService,
    calls: Mutex<Vec<(Op, Option<SessionId>)>>,
    failing: Mutex<HashSet<Op>>,
    holds: Mutex<HashMap<(Op, SessionId), Arc<Notify>>>,
}

impl ScriptedService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inner(&self) -> &InMemorySessionService {
        &self.inner
    }

    pub fn fail(&self, op: Op) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.failing.lock().unwrap().remove(&op);
    }

    pub fn calls(&self, op: Op) -> usize {
        self.calls.lock().unwrap().iter().filter(|(o, _)| *o == op).count()
    }

    pub fn calls_for(&self, op: Op, id: &SessionId) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(o, i)| *o == op && i.as_ref() == Some(id))
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Calls of `op` for `id` block until the returned handle is notified
    pub fn hold(&self, op: Op, id: &SessionId) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.holds
            .lock()
            .unwrap()
            .insert((op, id.clone()), notify.clone());
        notify
    }

    pub fn hold_interests(&self, id: &SessionId) -> Arc<Notify> {
        self.hold(Op::FetchInterests, id)
    }

    async fn wait_if_held(&self, op: Op, id: &SessionId) {
        let hold = self.holds.lock().unwrap().get(&(op, id.clone())).cloned();
        if let Some(hold) = hold {
            hold.notified().await;
        }
    }

    pub fn set_interests(&self, id: &SessionId, interests: Vec<Interest>) {
        self.inner.set_interests(id, interests).unwrap();
    }

    fn record(&self, op: Op, id: Option<&SessionId>) -> SurveyorResult<()> {
        self.calls.lock().unwrap().push((op, id.cloned()));
        if self.failing.lock().unwrap().contains(&op) {
            return Err(SurveyorError::RequestError(format!("injected {:?} failure", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionService for ScriptedService {
    async fn list_sessions(&self) -> SurveyorResult<Vec<Session>> {
        self.record(Op::List, None)?;
        self.inner.list_sessions().await
    }

    async fn create_session(&self, prompt: &str, consent: bool) -> SurveyorResult<CreatedSession> {
        self.record(Op::Create, None)?;
        self.inner.create_session(prompt, consent).await
    }

    async fn fetch_session(&self, id: &SessionId) -> SurveyorResult<SessionStatus> {
        self.record(Op::FetchSession, Some(id))?;
        self.wait_if_held(Op::FetchSession, id).await;
        self.inner.fetch_session(id).await
    }

    async fn fetch_messages(&self, id: &SessionId) -> SurveyorResult<Vec<Message>> {
        self.record(Op::FetchMessages, Some(id))?;
        self.wait_if_held(Op::FetchMessages, id).await;
        self.inner.fetch_messages(id).await
    }

    async fn send_message(&self, id: &SessionId, message: &str) -> SurveyorResult<String> {
        self.record(Op::Send, Some(id))?;
        self.inner.send_message(id, message).await
    }

    async fn fetch_interests(&self, id: &SessionId) -> SurveyorResult<Vec<Interest>> {
        self.record(Op::FetchInterests, Some(id))?;
        // Snapshot before waiting, so the ranking reflects the moment of the request
        let snapshot = self.inner.fetch_interests(id).await;
        self.wait_if_held(Op::FetchInterests, id).await;
        snapshot
    }

    async fn pause(&self, id: &SessionId) -> SurveyorResult<()> {
        self.record(Op::Pause, Some(id))?;
        self.inner.pause(id).await
    }

    async fn resume(&self, id: &SessionId) -> SurveyorResult<()> {
        self.record(Op::Resume, Some(id))?;
        self.inner.resume(id).await
    }

    async fn delete_session(&self, id: &SessionId) -> SurveyorResult<()> {
        self.record(Op::Delete, Some(id))?;
        self.inner.delete_session(id).await
    }
}

/// Answers every question the same way and counts how often it was asked
#[derive(Debug, Default)]
pub struct FixedAnswer {
    answer: bool,
    asked: Mutex<usize>,
}

impl FixedAnswer {
    pub fn yes() -> Self {
        Self {
            answer: true,
            asked: Mutex::new(0),
        }
    }

    pub fn no() -> Self {
        Self {
            answer: false,
            asked: Mutex::new(0),
        }
    }

    pub fn asked(&self) -> usize {
        *self.asked.lock().unwrap()
    }
}

#[async_trait]
impl Confirmer for FixedAnswer {
    async fn confirm(&self, _question: &str) -> bool {
        *self.asked.lock().unwrap() += 1;
        self.answer
    }
}

pub fn controller(service: &Arc<ScriptedService>) -> SessionController {
    SessionController::new(service.clone(), PERIOD)
}

/// Let one full poll period (plus a margin) elapse on the paused test clock
pub async fn advance_one_period() {
    tokio::time::sleep(PERIOD + Duration::from_millis(100)).await;
}

pub fn ranking(names: &[(&str, f64)]) -> Vec<Interest> {
    names
        .iter()
        .map(|(name, confidence)| Interest::new(*name, *confidence, format!("talked about {}", name)))
        .collect()
}
