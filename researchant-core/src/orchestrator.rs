//! Task orchestrator — submit/poll/fetch lifecycle for one research request.
//!
//! The orchestrator owns everything mutable about a request cycle: the task
//! handle, the poll task, and the observable view state. It accepts one
//! command, [`ResearchOrchestrator::submit`], and exposes state snapshots
//! plus a `watch` subscription for the presentation layer.
//!
//! Lifecycle per request:
//! 1. `submit` cancels any prior cycle, clears state, and sends one request
//!    to the analyze endpoint.
//! 2. On success, a poll task checks the status endpoint on a fixed period.
//!    Any status other than `"completed"` (unknown values included) means
//!    "still in progress".
//! 3. On `"completed"`, the poll task stops ticking and fetches the results
//!    exactly once.
//!
//! Every failure is terminal for the cycle: a fixed user-visible message is
//! recorded and nothing is retried. The poll task is cancellable; after
//! [`ResearchOrchestrator::teardown`] no tick fires and an in-flight
//! request's outcome is discarded.

use crate::api::ResearchApi;
use crate::config::PollConfig;
use crate::error::OrchestratorError;
use crate::types::{ResearchRequest, ResearchResult, TaskHandle, TaskStatus};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Fixed user-visible messages, one per failing lifecycle step.
const MSG_SUBMIT_FAILED: &str = "Failed to start research. Please try again.";
const MSG_POLL_FAILED: &str = "Error polling research status.";
const MSG_FETCH_FAILED: &str = "Error fetching research results.";

/// Observable state exposed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResearchView {
    /// True from submission until the cycle ends (report stored or error
    /// recorded).
    pub loading: bool,
    /// Last status reported by the remote service, verbatim. Empty until the
    /// first status is known.
    pub status: TaskStatus,
    /// The finished report, present only after a successful fetch.
    pub result: Option<ResearchResult>,
    /// Fixed user-visible message for the failure that ended the cycle.
    pub error: Option<String>,
}

/// A cancellable handle to the spawned poll loop.
struct PollTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollTask {
    fn cancel(self) {
        self.token.cancel();
        self.handle.abort();
    }
}

/// Coordinates submit/poll/fetch for exactly one research task at a time.
///
/// Invariant: at most one task handle and one poll task exist per instance.
/// Submitting again cancels the prior poll task before starting a new cycle.
pub struct ResearchOrchestrator {
    api: Arc<dyn ResearchApi>,
    poll_interval: Duration,
    state: watch::Sender<ResearchView>,
    poll_task: Option<PollTask>,
    task: Option<TaskHandle>,
}

impl ResearchOrchestrator {
    pub fn new(api: Arc<dyn ResearchApi>, config: &PollConfig) -> Self {
        let (state, _) = watch::channel(ResearchView::default());
        Self {
            api,
            poll_interval: Duration::from_secs(config.interval_secs),
            state,
            poll_task: None,
            task: None,
        }
    }

    /// Snapshot of the current observable state.
    pub fn view(&self) -> ResearchView {
        self.state.borrow().clone()
    }

    /// Subscribe to observable state changes.
    pub fn subscribe(&self) -> watch::Receiver<ResearchView> {
        self.state.subscribe()
    }

    /// The handle of the outstanding task, if a cycle is in progress.
    pub fn task(&self) -> Option<&TaskHandle> {
        self.task.as_ref()
    }

    /// Submit a research request and start polling for its completion.
    ///
    /// Cancels any prior cycle first. On success the returned handle is also
    /// retained internally and a poll task begins checking the task status on
    /// the configured period. On failure the fixed submission message is
    /// recorded in the view and the error is returned; nothing is retried.
    pub async fn submit(
        &mut self,
        request: ResearchRequest,
    ) -> Result<TaskHandle, OrchestratorError> {
        self.cancel_poll();
        self.task = None;
        self.state.send_replace(ResearchView {
            loading: true,
            ..ResearchView::default()
        });

        debug!(topic = request.topic.as_str(), "Submitting research request");
        match self.api.analyze(&request).await {
            Ok(created) => {
                let handle = TaskHandle {
                    task_id: created.task_id,
                    initial_status: created.status.clone(),
                    submitted_at: Utc::now(),
                };
                self.state
                    .send_modify(|view| view.status = created.status);
                self.task = Some(handle.clone());
                self.spawn_poll(handle.task_id.clone());
                Ok(handle)
            }
            Err(e) => {
                warn!(error = %e, "Research submission failed");
                self.state.send_modify(|view| {
                    view.error = Some(MSG_SUBMIT_FAILED.to_string());
                    view.loading = false;
                });
                Err(OrchestratorError::Submission { source: e })
            }
        }
    }

    /// Stop the poll loop. No tick fires after this returns; the outcome of
    /// an in-flight request is discarded.
    pub fn teardown(&mut self) {
        self.cancel_poll();
    }

    fn cancel_poll(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.cancel();
        }
    }

    fn spawn_poll(&mut self, task_id: String) {
        let token = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(
            Arc::clone(&self.api),
            self.state.clone(),
            task_id,
            self.poll_interval,
            token.clone(),
        ));
        self.poll_task = Some(PollTask { token, handle });
    }
}

impl Drop for ResearchOrchestrator {
    fn drop(&mut self) {
        self.cancel_poll();
    }
}

/// The poll loop: one status request per tick, then exactly one results
/// fetch once `"completed"` is observed.
///
/// Requests are awaited sequentially inside the loop, so two polls are never
/// outstanding at once. The cancellation token is raced at every await
/// point; once cancelled, no state write happens and an in-flight request's
/// result is dropped.
async fn poll_loop(
    api: Arc<dyn ResearchApi>,
    state: watch::Sender<ResearchView>,
    task_id: String,
    period: Duration,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; consume it so the first status
    // check happens one full period after submission.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = ticker.tick() => {}
        }

        let polled = tokio::select! {
            _ = token.cancelled() => return,
            result = api.status(&task_id) => result,
        };

        match polled {
            Ok(response) => {
                let status = response.status;
                debug!(task_id = task_id.as_str(), status = status.as_str(), "Poll tick");
                if matches!(status.as_str(), "failed" | "error") {
                    // Non-terminal by contract: the service only promises
                    // "completed". Surface it in logs since the task will
                    // never finish.
                    warn!(
                        task_id = task_id.as_str(),
                        status = status.as_str(),
                        "Remote task reported a failure-like status; continuing to poll"
                    );
                }
                let completed = status.is_completed();
                state.send_modify(|view| view.status = status);

                if completed {
                    fetch_results(&*api, &state, &task_id, &token).await;
                    return;
                }
            }
            Err(e) => {
                warn!(task_id = task_id.as_str(), error = %e, "Status poll failed");
                state.send_modify(|view| {
                    view.error = Some(MSG_POLL_FAILED.to_string());
                    view.loading = false;
                });
                return;
            }
        }
    }
}

/// The fetch step: runs exactly once per completed task. Clears `loading`
/// whether it succeeds or fails; a failure leaves `status` untouched.
async fn fetch_results(
    api: &dyn ResearchApi,
    state: &watch::Sender<ResearchView>,
    task_id: &str,
    token: &CancellationToken,
) {
    let fetched = tokio::select! {
        _ = token.cancelled() => return,
        result = api.results(task_id) => result,
    };

    match fetched {
        Ok(report) => {
            debug!(task_id, "Research results stored");
            state.send_modify(|view| {
                view.result = Some(report);
                view.loading = false;
            });
        }
        Err(e) => {
            warn!(task_id, error = %e, "Results fetch failed");
            state.send_modify(|view| {
                view.error = Some(MSG_FETCH_FAILED.to_string());
                view.loading = false;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockResearchApi;
    use crate::error::ApiError;
    use crate::types::{Depth, ResearchType};
    use pretty_assertions::assert_eq;

    const PERIOD: Duration = Duration::from_secs(3);

    fn sample_request() -> ResearchRequest {
        ResearchRequest::new(
            "Marie Gold Biscuit market analysis",
            ResearchType::MarketAnalysis,
            Depth::Comprehensive,
        )
    }

    fn network_error() -> ApiError {
        ApiError::Request {
            message: "connection refused".into(),
        }
    }

    fn orchestrator(mock: &Arc<MockResearchApi>) -> ResearchOrchestrator {
        let api: Arc<dyn ResearchApi> = mock.clone();
        ResearchOrchestrator::new(api, &PollConfig { interval_secs: 3 })
    }

    /// Scenario: creation succeeds, two pending ticks, then completion and a
    /// successful fetch.
    #[tokio::test(start_paused = true)]
    async fn test_happy_path_completes_after_pending_ticks() {
        let mock = Arc::new(MockResearchApi::new());
        mock.queue_analyze_ok("abc123", "pending");
        mock.queue_status_ok("pending");
        mock.queue_status_ok("pending");
        mock.queue_status_ok("completed");
        mock.queue_results_ok(MockResearchApi::sample_report());

        let mut orch = orchestrator(&mock);
        let mut rx = orch.subscribe();

        let handle = orch.submit(sample_request()).await.unwrap();
        assert_eq!(handle.task_id, "abc123");
        assert_eq!(mock.analyze_calls(), 1);
        // No poll happens before the first period elapses.
        assert_eq!(mock.status_calls(), 0);

        let view = orch.view();
        assert!(view.loading);
        assert_eq!(view.status.as_str(), "pending");
        assert!(view.result.is_none());
        assert!(view.error.is_none());

        let final_view = rx
            .wait_for(|view| view.result.is_some())
            .await
            .unwrap()
            .clone();
        assert!(!final_view.loading);
        assert_eq!(final_view.status.as_str(), "completed");
        assert_eq!(final_view.result, Some(MockResearchApi::sample_report()));
        assert!(final_view.error.is_none());

        assert_eq!(mock.status_calls(), 3);
        assert_eq!(mock.results_calls(), 1);
    }

    /// Scenario: the creation request fails.
    #[tokio::test(start_paused = true)]
    async fn test_submission_failure_records_message() {
        let mock = Arc::new(MockResearchApi::new());
        mock.queue_analyze_err(network_error());

        let mut orch = orchestrator(&mock);
        let err = orch.submit(sample_request()).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Submission { .. }));

        let view = orch.view();
        assert!(!view.loading);
        assert_eq!(view.error.as_deref(), Some(MSG_SUBMIT_FAILED));
        assert!(view.status.is_empty());
        assert!(view.result.is_none());
        assert!(orch.task().is_none());

        // No poll task was started.
        tokio::time::advance(PERIOD * 10).await;
        tokio::task::yield_now().await;
        assert_eq!(mock.status_calls(), 0);
    }

    /// Scenario: creation succeeds, the first status check fails.
    #[tokio::test(start_paused = true)]
    async fn test_poll_failure_stops_polling() {
        let mock = Arc::new(MockResearchApi::new());
        mock.queue_analyze_ok("abc123", "pending");
        mock.queue_status_err(network_error());

        let mut orch = orchestrator(&mock);
        let mut rx = orch.subscribe();
        orch.submit(sample_request()).await.unwrap();

        let view = rx
            .wait_for(|view| view.error.is_some())
            .await
            .unwrap()
            .clone();
        assert!(!view.loading);
        assert_eq!(view.error.as_deref(), Some(MSG_POLL_FAILED));
        assert!(view.result.is_none());

        // The timer is stopped: no further status checks ever happen.
        tokio::time::advance(PERIOD * 10).await;
        tokio::task::yield_now().await;
        assert_eq!(mock.status_calls(), 1);
        assert_eq!(mock.results_calls(), 0);
    }

    /// Scenario: task completes but the results fetch fails; the completed
    /// status is retained.
    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_keeps_completed_status() {
        let mock = Arc::new(MockResearchApi::new());
        mock.queue_analyze_ok("abc123", "pending");
        mock.queue_status_ok("completed");
        mock.queue_results_err(network_error());

        let mut orch = orchestrator(&mock);
        let mut rx = orch.subscribe();
        orch.submit(sample_request()).await.unwrap();

        let view = rx
            .wait_for(|view| view.error.is_some())
            .await
            .unwrap()
            .clone();
        assert!(!view.loading);
        assert_eq!(view.status.as_str(), "completed");
        assert_eq!(view.error.as_deref(), Some(MSG_FETCH_FAILED));
        assert!(view.result.is_none());

        assert_eq!(mock.results_calls(), 1);
        // Polling does not resume after the fetch step.
        tokio::time::advance(PERIOD * 10).await;
        tokio::task::yield_now().await;
        assert_eq!(mock.status_calls(), 1);
    }

    /// Unknown status values are stored verbatim and treated as "still in
    /// progress".
    #[tokio::test(start_paused = true)]
    async fn test_unknown_status_keeps_polling() {
        let mock = Arc::new(MockResearchApi::new());
        mock.queue_analyze_ok("abc123", "queued");
        mock.queue_status_ok("warming_up");
        mock.queue_status_ok("failed");
        mock.queue_status_ok("completed");
        mock.queue_results_ok(MockResearchApi::sample_report());

        let mut orch = orchestrator(&mock);
        let mut rx = orch.subscribe();
        orch.submit(sample_request()).await.unwrap();
        assert_eq!(orch.view().status.as_str(), "queued");

        let seen = rx
            .wait_for(|view| view.status.as_str() == "warming_up")
            .await
            .unwrap()
            .clone();
        assert!(seen.loading);

        let final_view = rx
            .wait_for(|view| view.result.is_some())
            .await
            .unwrap()
            .clone();
        assert_eq!(final_view.status.as_str(), "completed");
        assert_eq!(mock.status_calls(), 3);
    }

    /// After teardown, no tick fires even if one was pending.
    #[tokio::test(start_paused = true)]
    async fn test_teardown_stops_pending_ticks() {
        let mock = Arc::new(MockResearchApi::new());
        mock.queue_analyze_ok("abc123", "pending");
        mock.queue_status_ok("pending");

        let mut orch = orchestrator(&mock);
        orch.submit(sample_request()).await.unwrap();
        orch.teardown();

        tokio::time::advance(PERIOD * 10).await;
        tokio::task::yield_now().await;
        assert_eq!(mock.status_calls(), 0);
        // Teardown only stops the timer; it does not rewrite the view.
        assert!(orch.view().loading);
    }

    /// An in-flight status request's outcome is discarded once cancelled.
    #[tokio::test(start_paused = true)]
    async fn test_inflight_poll_discarded_on_teardown() {
        let mock = Arc::new(MockResearchApi::new());
        mock.queue_analyze_ok("abc123", "pending");
        mock.queue_status_hang();

        let mut orch = orchestrator(&mock);
        orch.submit(sample_request()).await.unwrap();
        let view_before = orch.view();

        // Let the poll task start, then the first tick fire, so the status
        // request goes in-flight.
        tokio::task::yield_now().await;
        tokio::time::advance(PERIOD).await;
        tokio::task::yield_now().await;
        assert_eq!(mock.status_calls(), 1);

        orch.teardown();
        tokio::time::advance(PERIOD * 10).await;
        tokio::task::yield_now().await;

        // Nothing observable changed after cancellation.
        assert_eq!(orch.view(), view_before);
        assert_eq!(mock.status_calls(), 1);
    }

    /// Submitting again cancels the prior cycle before starting a new one.
    #[tokio::test(start_paused = true)]
    async fn test_resubmit_cancels_prior_cycle() {
        let mock = Arc::new(MockResearchApi::new());
        mock.queue_analyze_ok("first", "pending");

        let mut orch = orchestrator(&mock);
        let mut rx = orch.subscribe();
        orch.submit(sample_request()).await.unwrap();
        assert_eq!(orch.task().unwrap().task_id, "first");

        // Second cycle begins before the first ever polled; the first poll
        // task is cancelled, so only the second cycle's statuses are consumed.
        mock.queue_analyze_ok("second", "pending");
        mock.queue_status_ok("completed");
        mock.queue_results_ok(MockResearchApi::sample_report());

        let handle = orch.submit(sample_request()).await.unwrap();
        assert_eq!(handle.task_id, "second");
        assert_eq!(mock.analyze_calls(), 2);

        let final_view = rx
            .wait_for(|view| view.result.is_some())
            .await
            .unwrap()
            .clone();
        assert_eq!(final_view.status.as_str(), "completed");
        assert_eq!(mock.status_calls(), 1);
        assert_eq!(mock.results_calls(), 1);
    }

    /// A new submission clears the previous cycle's error and result.
    #[tokio::test(start_paused = true)]
    async fn test_resubmit_clears_previous_outcome() {
        let mock = Arc::new(MockResearchApi::new());
        mock.queue_analyze_err(network_error());

        let mut orch = orchestrator(&mock);
        let _ = orch.submit(sample_request()).await;
        assert!(orch.view().error.is_some());

        mock.queue_analyze_ok("retry", "pending");
        orch.submit(sample_request()).await.unwrap();

        let view = orch.view();
        assert!(view.loading);
        assert!(view.error.is_none());
        assert!(view.result.is_none());
        assert_eq!(view.status.as_str(), "pending");
    }

    /// Dropping the orchestrator cancels the poll task.
    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_poll() {
        let mock = Arc::new(MockResearchApi::new());
        mock.queue_analyze_ok("abc123", "pending");
        mock.queue_status_ok("pending");

        let mut orch = orchestrator(&mock);
        orch.submit(sample_request()).await.unwrap();
        drop(orch);

        tokio::time::advance(PERIOD * 10).await;
        tokio::task::yield_now().await;
        assert_eq!(mock.status_calls(), 0);
    }
}
