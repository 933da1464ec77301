//! Recurring refresh of the interest ranking for the active session.
//!
//! At most one poll task exists at a time. Each task carries the session id and the
//! epoch it was started under; `stop` bumps the epoch before aborting the task, so a
//! ranking fetched by a task that has since been cancelled is never written back.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use surveyor_core::{Interest, SessionId, SessionServiceRef};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::state::SharedState;

#[derive(Debug)]
struct ActivePoll {
    session_id: SessionId,
    task: JoinHandle<()>,
}

/// Owns the single poll timer of the client
#[derive(Debug)]
pub struct PollingScheduler {
    service: SessionServiceRef,
    state: SharedState,
    period: Duration,
    epoch: Arc<AtomicU64>,
    current: Option<ActivePoll>,
}

impl PollingScheduler {
    pub fn new(service: SessionServiceRef, state: SharedState, period: Duration) -> Self {
        Self {
            service,
            state,
            period,
            epoch: Arc::new(AtomicU64::new(0)),
            current: None,
        }
    }

    /// Cancel any running poll, then poll `session_id` every period.
    /// The first refresh happens one full period after the call.
    pub fn start(&mut self, session_id: SessionId) {
        self.stop();

        let ticker = Ticker {
            service: self.service.clone(),
            state: self.state.clone(),
            epoch_counter: self.epoch.clone(),
            epoch: self.epoch.load(Ordering::SeqCst),
            session_id: session_id.clone(),
        };
        let period = self.period;
        let task = tokio::spawn(ticker.run(period));

        info!(session = %session_id, ?period, "Started interest polling");
        self.current = Some(ActivePoll { session_id, task });
    }

    /// Cancel the running poll, if any. Safe to call repeatedly.
    pub fn stop(&mut self) {
        // Invalidate before aborting so an in-flight tick cannot apply its result
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(poll) = self.current.take() {
            poll.task.abort();
            debug!(session = %poll.session_id, "Stopped interest polling");
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.as_ref().is_some_and(|poll| !poll.task.is_finished())
    }

    /// The session the running poll is bound to
    pub fn bound_session(&self) -> Option<&SessionId> {
        self.current.as_ref().map(|poll| &poll.session_id)
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Ticker {
    service: SessionServiceRef,
    state: SharedState,
    epoch_counter: Arc<AtomicU64>,
    epoch: u64,
    session_id: SessionId,
}

impl Ticker {
    async fn run(self, period: Duration) {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            self.tick().await;
        }
    }

    async fn tick(&self) {
        // Read the flag at tick time so a pause between ticks is honoured immediately
        if self.state.lock().await.view.paused {
            debug!(session = %self.session_id, "Session paused, skipping poll tick");
            return;
        }

        match self.service.fetch_interests(&self.session_id).await {
            Ok(interests) => {
                let count = interests.len();
                if apply_interests(
                    &self.state,
                    &self.epoch_counter,
                    self.epoch,
                    &self.session_id,
                    interests,
                )
                .await
                {
                    debug!(session = %self.session_id, count, "Installed interest ranking");
                } else {
                    debug!(session = %self.session_id, "Discarding ranking from a cancelled poll");
                }
            }
            Err(e) => {
                // Keep polling; the next tick may succeed
                warn!(session = %self.session_id, error = %e, "Failed to poll interests");
            }
        }
    }
}

/// Replace the ranking wholesale, but only if the poll that fetched it is still the
/// current one and still bound to the active session. Returns whether it was applied.
async fn apply_interests(
    state: &SharedState,
    epoch_counter: &AtomicU64,
    epoch: u64,
    session_id: &SessionId,
    interests: Vec<Interest>,
) -> bool {
    {
        let mut guard = state.lock().await;
        if epoch_counter.load(Ordering::SeqCst) != epoch || !guard.view.is_active(session_id) {
            return false;
        }
        guard.view.interests = interests;
    }
    state.notify_interests();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use surveyor_core::adapters::InMemorySessionService;
    use surveyor_core::SessionService;

    const PERIOD: Duration = Duration::from_secs(3);

    async fn setup() -> (Arc<InMemorySessionService>, SharedState, PollingScheduler, SessionId) {
        let service = Arc::new(InMemorySessionService::new());
        let id = service.create_session("fitness", true).await.unwrap().session_id;
        service
            .set_interests(&id, vec![Interest::new("running", 0.8, "shoes")])
            .unwrap();

        let state = SharedState::new();
        state.lock().await.view.active_id = Some(id.clone());
        let poller = PollingScheduler::new(service.clone(), state.clone(), PERIOD);
        (service, state, poller, id)
    }

    async fn advance_one_period() {
        tokio::time::sleep(PERIOD + Duration::from_millis(100)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn first_refresh_waits_one_period() {
        let (_service, state, mut poller, id) = setup().await;
        poller.start(id.clone());
        assert!(poller.is_active());
        assert_eq!(poller.bound_session(), Some(&id));

        tokio::time::sleep(PERIOD - Duration::from_millis(100)).await;
        assert!(state.lock().await.view.interests.is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(state.lock().await.view.interests.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_flag_is_checked_at_tick_time() {
        let (_service, state, mut poller, id) = setup().await;
        poller.start(id);

        state.lock().await.view.paused = true;
        advance_one_period().await;
        assert!(state.lock().await.view.interests.is_empty());

        // Same timer picks up again once the flag clears
        state.lock().await.view.paused = false;
        advance_one_period().await;
        assert_eq!(state.lock().await.view.interests[0].name, "running");
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_halts_updates() {
        let (_service, state, mut poller, id) = setup().await;
        poller.stop();
        poller.start(id);
        poller.stop();
        poller.stop();
        assert!(!poller.is_active());
        assert_eq!(poller.bound_session(), None);

        advance_one_period().await;
        assert!(state.lock().await.view.interests.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_notify_subscribers() {
        let (_service, state, mut poller, id) = setup().await;
        let mut rx = state.subscribe_interests();
        poller.start(id);

        advance_one_period().await;
        assert!(rx.has_changed().unwrap());
        let _ = rx.borrow_and_update();

        advance_one_period().await;
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn stale_epoch_is_not_applied() {
        let state = SharedState::new();
        let id = SessionId::from(1u64);
        state.lock().await.view.active_id = Some(id.clone());
        let counter = AtomicU64::new(5);

        let ranking = vec![Interest::new("travel", 0.5, "")];
        assert!(!apply_interests(&state, &counter, 4, &id, ranking.clone()).await);
        assert!(state.lock().await.view.interests.is_empty());

        assert!(apply_interests(&state, &counter, 5, &id, ranking).await);
        assert_eq!(state.lock().await.view.interests.len(), 1);
    }

    #[tokio::test]
    async fn ranking_for_inactive_session_is_not_applied() {
        let state = SharedState::new();
        state.lock().await.view.active_id = Some(SessionId::from(2u64));
        let counter = AtomicU64::new(0);

        let applied = apply_interests(
            &state,
            &counter,
            0,
            &SessionId::from(1u64),
            vec![Interest::new("travel", 0.5, "")],
        )
        .await;
        assert!(!applied);
        assert!(state.lock().await.view.interests.is_empty());
    }
}
