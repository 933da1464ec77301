//! One-shot confirmation steps: the consent gate in front of session creation and the
//! yes/no guard in front of a reset.

use async_trait::async_trait;
use surveyor_core::{SessionId, SurveyorResult};
use tracing::{debug, warn};

use crate::controller::SessionController;

/// `Idle -> Pending(T) -> Idle`, leaving through either `commit` or `dismiss`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate<T> {
    Idle,
    Pending(T),
}

impl<T> Default for Gate<T> {
    fn default() -> Self {
        Gate::Idle
    }
}

impl<T> Gate<T> {
    /// Move to `Pending`, replacing whatever was pending before
    pub fn arm(&mut self, value: T) {
        *self = Gate::Pending(value);
    }

    /// Leave `Pending` and hand out the value. Yields `None` when nothing is pending,
    /// so a second commit of the same request does nothing.
    pub fn commit(&mut self) -> Option<T> {
        match std::mem::take(self) {
            Gate::Pending(value) => Some(value),
            Gate::Idle => None,
        }
    }

    /// Back to `Idle` without acting on the pending value
    pub fn dismiss(&mut self) {
        *self = Gate::Idle;
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Gate::Pending(_))
    }

    pub fn pending(&self) -> Option<&T> {
        match self {
            Gate::Pending(value) => Some(value),
            Gate::Idle => None,
        }
    }
}

/// A blocking yes/no decision taken by the user
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, question: &str) -> bool;
}

/// Sits between "start a session with this prompt" and the actual creation
#[derive(Debug, Default)]
pub struct ConsentGate {
    gate: Gate<String>,
}

impl ConsentGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for consent to start a session for `prompt`. Empty prompts are ignored.
    /// Nothing is sent to the service.
    pub fn request_start(&mut self, prompt: &str) -> bool {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            warn!("Ignoring session start without a prompt");
            return false;
        }
        self.gate.arm(prompt.to_string());
        debug!("Consent requested for new session");
        true
    }

    pub fn is_pending(&self) -> bool {
        self.gate.is_pending()
    }

    pub fn pending_prompt(&self) -> Option<&str> {
        self.gate.pending().map(String::as_str)
    }

    /// Consent given: create the pending session exactly once.
    /// Returns `Ok(None)` when no request was pending.
    pub async fn confirm(
        &mut self,
        controller: &mut SessionController,
    ) -> SurveyorResult<Option<SessionId>> {
        // Cleared before the create call, so a repeated confirm finds nothing pending
        let Some(prompt) = self.gate.commit() else {
            debug!("Consent confirmed with no pending request");
            return Ok(None);
        };
        match controller.create_session(&prompt, true).await {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                // Keep the prompt so the user can retry with /consent
                self.gate.arm(prompt);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use surveyor_core::adapters::InMemorySessionService;
    use surveyor_core::SessionService;

    #[test]
    fn gate_commits_once() {
        let mut gate = Gate::default();
        assert!(!gate.is_pending());
        gate.arm(7);
        assert_eq!(gate.pending(), Some(&7));
        assert_eq!(gate.commit(), Some(7));
        assert_eq!(gate.commit(), None);
        assert_eq!(gate, Gate::Idle);
    }

    #[test]
    fn dismissed_gate_yields_nothing() {
        let mut gate = Gate::default();
        gate.arm("reset");
        gate.dismiss();
        assert_eq!(gate.commit(), None);
    }

    #[test]
    fn empty_prompt_does_not_open_the_gate() {
        let mut consent = ConsentGate::new();
        assert!(!consent.request_start(""));
        assert!(!consent.request_start("   "));
        assert!(!consent.is_pending());

        assert!(consent.request_start(" help me shop "));
        assert_eq!(consent.pending_prompt(), Some("help me shop"));
    }

    #[tokio::test]
    async fn double_confirm_creates_one_session() {
        let service = Arc::new(InMemorySessionService::new());
        let mut controller = SessionController::new(service.clone(), Duration::from_secs(3));
        let mut consent = ConsentGate::new();

        consent.request_start("help me shop");
        let first = consent.confirm(&mut controller).await.unwrap();
        let second = consent.confirm(&mut controller).await.unwrap();

        assert!(first.is_some());
        assert_eq!(second, None);
        assert!(!consent.is_pending());
        assert_eq!(service.list_sessions().await.unwrap().len(), 1);
        controller.shutdown();
    }

    #[tokio::test]
    async fn unconfirmed_request_creates_nothing() {
        let service = Arc::new(InMemorySessionService::new());
        let mut consent = ConsentGate::new();

        consent.request_start("travel");
        assert!(consent.is_pending());
        assert!(service.list_sessions().await.unwrap().is_empty());
    }
}
