//! The session state machine behind the terminal front-end.
//!
//! All changes to the active session view go through the operations on
//! [`SessionController`]. Operations that switch sessions (create, select, reset) stop the
//! poll timer before they talk to the service, so a refresh for the previous session can
//! never land in the next one.

use std::time::Duration;

use surveyor_core::{
    Message, Session, SessionId, SessionServiceRef, SessionView, SurveyorError, SurveyorResult,
};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::gate::{Confirmer, Gate};
use crate::poller::PollingScheduler;
use crate::state::SharedState;

pub const RESET_QUESTION: &str = "Are you sure you want to reset this session? \
This permanently deletes all messages and session data; you will need to start a new session afterward.";

/// Result of [`SessionController::send_message`]
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// No active session or nothing to send
    Ignored,
    /// The session is paused; nothing was sent
    RejectedPaused,
    /// The agent's reply, already appended to the transcript
    Delivered(Message),
}

/// Result of [`SessionController::toggle_pause`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseOutcome {
    Ignored,
    Paused,
    Resumed,
}

/// Result of [`SessionController::reset_session`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    Ignored,
    /// The user said no; nothing changed
    Declined,
    Reset(SessionId),
}

#[derive(Debug)]
pub struct SessionController {
    service: SessionServiceRef,
    state: SharedState,
    poller: PollingScheduler,
}

impl SessionController {
    pub fn new(service: SessionServiceRef, poll_interval: Duration) -> Self {
        let state = SharedState::new();
        let poller = PollingScheduler::new(service.clone(), state.clone(), poll_interval);
        Self {
            service,
            state,
            poller,
        }
    }

    /// Snapshot of the active session view
    pub async fn view(&self) -> SessionView {
        self.state.lock().await.view.clone()
    }

    /// Snapshot of the session index
    pub async fn sessions(&self) -> Vec<Session> {
        self.state.lock().await.sessions.clone()
    }

    /// Handle on the state behind the snapshots, for readers that run alongside an operation
    pub fn shared_state(&self) -> SharedState {
        self.state.clone()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_active()
    }

    pub fn polled_session(&self) -> Option<&SessionId> {
        self.poller.bound_session()
    }

    /// Changes whenever a poll installs a new interest ranking
    pub fn subscribe_interests(&self) -> watch::Receiver<u64> {
        self.state.subscribe_interests()
    }

    /// Refresh the session index. Failures are logged and the previous index is kept.
    pub async fn list_sessions(&self) {
        match self.service.list_sessions().await {
            Ok(sessions) => {
                debug!("Session index refreshed ({} sessions)", sessions.len());
                self.state.lock().await.sessions = sessions;
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch sessions, keeping the previous list");
            }
        }
    }

    /// Start a new session and make it the active one.
    ///
    /// Requires a non-empty prompt and the user's consent. On failure the view is left
    /// exactly as it was.
    pub async fn create_session(&mut self, prompt: &str, consent: bool) -> SurveyorResult<SessionId> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            warn!("Refusing to create a session without a prompt");
            return Err(SurveyorError::EmptyPrompt);
        }
        if !consent {
            warn!("Refusing to create a session without consent");
            return Err(SurveyorError::ConsentRequired);
        }

        let previous_poll = self.poller.bound_session().cloned();
        self.poller.stop();

        let created = match self.service.create_session(prompt, consent).await {
            Ok(created) => created,
            Err(e) => {
                error!(error = %e, "Failed to start session");
                self.restore_poll(previous_poll).await;
                return Err(e);
            }
        };

        let id = created.session_id;
        {
            let mut state = self.state.lock().await;
            state.view = SessionView {
                active_id: Some(id.clone()),
                transcript: vec![Message::agent(created.initial_message)],
                interests: Vec::new(),
                paused: false,
            };
        }
        info!(session = %id, "Started new session");

        self.list_sessions().await;
        self.poller.start(id.clone());
        Ok(id)
    }

    /// Make `id` the active session, loading its state from the service.
    ///
    /// Polling resumes only if the freshly fetched status says the session is running.
    pub async fn select_session(&mut self, id: SessionId) -> SurveyorResult<()> {
        self.poller.stop();
        {
            // Nothing of the previous session survives the switch, its paused flag included
            self.state.lock().await.view = SessionView {
                active_id: Some(id.clone()),
                ..SessionView::default()
            };
        }
        debug!(session = %id, "Switched active session, loading state");

        let status = self.service.fetch_session(&id).await.map_err(|e| {
            error!(session = %id, error = %e, "Failed to load session");
            e
        })?;
        self.state.lock().await.view.paused = status.paused;

        let messages = self.service.fetch_messages(&id).await.map_err(|e| {
            error!(session = %id, error = %e, "Failed to load session messages");
            e
        })?;
        {
            let mut state = self.state.lock().await;
            state.view.transcript = messages;
        }
        info!(session = %id, paused = status.paused, "Loaded session");

        if !status.paused {
            self.poller.start(id);
        }
        Ok(())
    }

    /// Send a user message to the active session.
    ///
    /// The user message is appended before the service is called and stays in the
    /// transcript even if the call fails.
    pub async fn send_message(&self, text: &str) -> SurveyorResult<SendOutcome> {
        let text = text.trim();
        let id = {
            let mut state = self.state.lock().await;
            let Some(id) = state.view.active_id.clone() else {
                return Ok(SendOutcome::Ignored);
            };
            if text.is_empty() {
                return Ok(SendOutcome::Ignored);
            }
            if state.view.paused {
                warn!(session = %id, "Session is paused, message not sent");
                return Ok(SendOutcome::RejectedPaused);
            }
            state.view.transcript.push(Message::user(text));
            id
        };

        let reply = match self.service.send_message(&id, text).await {
            Ok(reply) => Message::agent(reply),
            Err(e) => {
                error!(session = %id, error = %e, "Failed to send message");
                return Err(e);
            }
        };

        let mut state = self.state.lock().await;
        if state.view.is_active(&id) {
            state.view.transcript.push(reply.clone());
        }
        Ok(SendOutcome::Delivered(reply))
    }

    /// Pause a running session or resume a paused one.
    ///
    /// The local flag only changes once the service has acknowledged the call. The
    /// session index is refreshed either way.
    pub async fn toggle_pause(&mut self) -> SurveyorResult<PauseOutcome> {
        let (id, paused) = {
            let state = self.state.lock().await;
            match &state.view.active_id {
                Some(id) => (id.clone(), state.view.paused),
                None => return Ok(PauseOutcome::Ignored),
            }
        };

        let result = if paused {
            self.resume(&id).await
        } else {
            self.pause(&id).await
        };

        self.list_sessions().await;
        result
    }

    async fn resume(&mut self, id: &SessionId) -> SurveyorResult<PauseOutcome> {
        if let Err(e) = self.service.resume(id).await {
            error!(session = %id, error = %e, "Failed to resume session");
            return Err(e);
        }
        self.state.lock().await.view.paused = false;
        self.poller.start(id.clone());
        info!(session = %id, "Session resumed");
        Ok(PauseOutcome::Resumed)
    }

    async fn pause(&mut self, id: &SessionId) -> SurveyorResult<PauseOutcome> {
        if let Err(e) = self.service.pause(id).await {
            error!(session = %id, error = %e, "Failed to pause session");
            return Err(e);
        }
        self.state.lock().await.view.paused = true;
        self.poller.stop();
        info!(session = %id, "Session paused");
        Ok(PauseOutcome::Paused)
    }

    /// Delete the active session after the user confirms, then clear the view.
    pub async fn reset_session(&mut self, confirmer: &dyn Confirmer) -> SurveyorResult<ResetOutcome> {
        let mut guard = Gate::default();
        let active_id = self.state.lock().await.view.active_id.clone();
        match active_id {
            Some(id) => guard.arm(id),
            None => return Ok(ResetOutcome::Ignored),
        }

        if !confirmer.confirm(RESET_QUESTION).await {
            guard.dismiss();
            debug!("Reset declined");
            return Ok(ResetOutcome::Declined);
        }
        let Some(id) = guard.commit() else {
            return Ok(ResetOutcome::Declined);
        };

        let previous_poll = self.poller.bound_session().cloned();
        self.poller.stop();

        if let Err(e) = self.service.delete_session(&id).await {
            error!(session = %id, error = %e, "Failed to reset session");
            self.restore_poll(previous_poll).await;
            return Err(e);
        }

        self.state.lock().await.view = SessionView::default();
        info!(session = %id, "Session reset");

        self.list_sessions().await;
        Ok(ResetOutcome::Reset(id))
    }

    /// Stop background work; called when the front-end goes away
    pub fn shutdown(&mut self) {
        self.poller.stop();
    }

    // Re-arm a poll that was stopped ahead of a failed switch, if it still matches the view
    async fn restore_poll(&mut self, previous: Option<SessionId>) {
        let Some(id) = previous else {
            return;
        };
        let still_running = {
            let state = self.state.lock().await;
            state.view.is_active(&id) && !state.view.paused
        };
        if still_running {
            self.poller.start(id);
        }
    }
}
