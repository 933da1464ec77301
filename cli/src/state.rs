use std::sync::Arc;

use surveyor_core::{Session, SessionView};
use tokio::sync::{watch, Mutex, MutexGuard};

/// Everything the controller holds for the presentation layer
#[derive(Debug, Default)]
pub struct ControllerState {
    pub view: SessionView,
    /// Sidebar listing, as last fetched
    pub sessions: Vec<Session>,
}

/// Handle to the controller state shared with the poll task.
///
/// The lock is never held across a service call.
#[derive(Debug, Clone)]
pub struct SharedState {
    inner: Arc<Mutex<ControllerState>>,
    interests_rev: Arc<watch::Sender<u64>>,
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedState {
    pub fn new() -> Self {
        let (interests_rev, _) = watch::channel(0);
        Self {
            inner: Arc::new(Mutex::new(ControllerState::default())),
            interests_rev: Arc::new(interests_rev),
        }
    }

    pub async fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.inner.lock().await
    }

    /// Receiver that changes every time a poll installs a new ranking
    pub fn subscribe_interests(&self) -> watch::Receiver<u64> {
        self.interests_rev.subscribe()
    }

    pub(crate) fn notify_interests(&self) {
        self.interests_rev.send_modify(|rev| *rev += 1);
    }
}
