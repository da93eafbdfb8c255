//! Research service API client.
//!
//! Defines the [`ResearchApi`] trait for the three remote endpoints, an HTTP
//! implementation over `reqwest`, and a scripted mock for tests. The remote
//! contract:
//!
//! - `POST /api/v1/research/analyze` — create a task
//! - `GET /api/v1/research/status/{task_id}` — check task status
//! - `GET /api/v1/research/results/{task_id}` — fetch the finished report

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::types::{ResearchRequest, ResearchResult, StatusResponse, TaskCreated, TaskStatus};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

/// Trait for the remote research service, one method per endpoint.
#[async_trait]
pub trait ResearchApi: Send + Sync {
    /// Create a research task. Returns the task identifier and initial status.
    async fn analyze(&self, request: &ResearchRequest) -> Result<TaskCreated, ApiError>;

    /// Check the status of an outstanding task.
    async fn status(&self, task_id: &str) -> Result<StatusResponse, ApiError>;

    /// Fetch the finished report for a completed task.
    async fn results(&self, task_id: &str) -> Result<ResearchResult, ApiError>;
}

/// HTTP implementation of [`ResearchApi`].
pub struct HttpResearchApi {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpResearchApi {
    /// Create a new client from configuration.
    ///
    /// The base URL is taken as-is apart from stripping a trailing slash;
    /// the per-request timeout applies to every endpoint.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::Request {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1/research/{}", self.base_url, path)
    }

    /// Map a transport-level `reqwest` error to an `ApiError`.
    fn map_request_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            ApiError::Request {
                message: format!("Request to research service failed: {e}"),
            }
        }
    }

    /// Read a response body as text, then parse it as JSON.
    async fn read_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| ApiError::ResponseParse {
                message: format!("Failed to read response body: {e}"),
            })?;

        Self::parse_body(status, &body_text)
    }

    /// Map an HTTP status and body text to a parsed value or a structured
    /// error. Non-success statuses become `ApiError::HttpStatus` with the
    /// body attached; parse failures carry the serde message.
    fn parse_body<T: DeserializeOwned>(
        status: reqwest::StatusCode,
        body_text: &str,
    ) -> Result<T, ApiError> {
        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                body: body_text.to_string(),
            });
        }

        serde_json::from_str(body_text).map_err(|e| ApiError::ResponseParse {
            message: format!("Invalid JSON in response: {e}"),
        })
    }
}

#[async_trait]
impl ResearchApi for HttpResearchApi {
    async fn analyze(&self, request: &ResearchRequest) -> Result<TaskCreated, ApiError> {
        let url = self.endpoint("analyze");
        debug!(url = url.as_str(), topic = request.topic.as_str(), "Creating research task");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        self.read_json(response).await
    }

    async fn status(&self, task_id: &str) -> Result<StatusResponse, ApiError> {
        let url = self.endpoint(&format!("status/{task_id}"));
        debug!(url = url.as_str(), "Checking task status");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        self.read_json(response).await
    }

    async fn results(&self, task_id: &str) -> Result<ResearchResult, ApiError> {
        let url = self.endpoint(&format!("results/{task_id}"));
        debug!(url = url.as_str(), "Fetching research results");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        self.read_json(response).await
    }
}

/// One scripted mock response: respond with a value/error, or hang forever.
///
/// `Hang` models a slow in-flight request; the future never resolves, so a
/// caller only gets past it by being cancelled.
pub enum MockResponse<T> {
    Respond(Result<T, ApiError>),
    Hang,
}

/// Mock implementation of [`ResearchApi`] with scripted response queues.
///
/// Each endpoint pops from its own FIFO queue and counts calls. An exhausted
/// queue yields a request error, so a test that over-polls fails loudly.
#[derive(Default)]
pub struct MockResearchApi {
    analyze_queue: Mutex<VecDeque<MockResponse<TaskCreated>>>,
    status_queue: Mutex<VecDeque<MockResponse<StatusResponse>>>,
    results_queue: Mutex<VecDeque<MockResponse<ResearchResult>>>,
    analyze_calls: AtomicUsize,
    status_calls: AtomicUsize,
    results_calls: AtomicUsize,
}

impl MockResearchApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful task creation.
    pub fn queue_analyze_ok(&self, task_id: &str, status: &str) {
        self.analyze_queue
            .lock()
            .unwrap()
            .push_back(MockResponse::Respond(Ok(TaskCreated {
                task_id: task_id.to_string(),
                status: TaskStatus::from(status),
            })));
    }

    /// Queue a failed task creation.
    pub fn queue_analyze_err(&self, error: ApiError) {
        self.analyze_queue
            .lock()
            .unwrap()
            .push_back(MockResponse::Respond(Err(error)));
    }

    /// Queue a successful status check.
    pub fn queue_status_ok(&self, status: &str) {
        self.status_queue
            .lock()
            .unwrap()
            .push_back(MockResponse::Respond(Ok(StatusResponse {
                status: TaskStatus::from(status),
            })));
    }

    /// Queue a failed status check.
    pub fn queue_status_err(&self, error: ApiError) {
        self.status_queue
            .lock()
            .unwrap()
            .push_back(MockResponse::Respond(Err(error)));
    }

    /// Queue a status check whose request never resolves.
    pub fn queue_status_hang(&self) {
        self.status_queue.lock().unwrap().push_back(MockResponse::Hang);
    }

    /// Queue a successful results fetch.
    pub fn queue_results_ok(&self, result: ResearchResult) {
        self.results_queue
            .lock()
            .unwrap()
            .push_back(MockResponse::Respond(Ok(result)));
    }

    /// Queue a failed results fetch.
    pub fn queue_results_err(&self, error: ApiError) {
        self.results_queue
            .lock()
            .unwrap()
            .push_back(MockResponse::Respond(Err(error)));
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn results_calls(&self) -> usize {
        self.results_calls.load(Ordering::SeqCst)
    }

    /// A small report for tests.
    pub fn sample_report() -> ResearchResult {
        ResearchResult {
            summary: "The market is growing steadily.".to_string(),
            findings: vec![
                "Finding one.".to_string(),
                "Finding two.".to_string(),
            ],
            competitors: Some(vec!["Acme Co".to_string()]),
            trends: Some(vec!["Premiumization".to_string()]),
            recommendations: Some(vec!["Expand distribution.".to_string()]),
        }
    }

    fn exhausted(endpoint: &str) -> ApiError {
        ApiError::Request {
            message: format!("mock response queue for '{endpoint}' is empty"),
        }
    }

    async fn pop<T>(
        queue: &Mutex<VecDeque<MockResponse<T>>>,
        counter: &AtomicUsize,
        endpoint: &str,
    ) -> Result<T, ApiError> {
        counter.fetch_add(1, Ordering::SeqCst);
        let next = queue.lock().unwrap().pop_front();
        match next {
            Some(MockResponse::Respond(result)) => result,
            Some(MockResponse::Hang) => std::future::pending().await,
            None => Err(Self::exhausted(endpoint)),
        }
    }
}

#[async_trait]
impl ResearchApi for MockResearchApi {
    async fn analyze(&self, _request: &ResearchRequest) -> Result<TaskCreated, ApiError> {
        Self::pop(&self.analyze_queue, &self.analyze_calls, "analyze").await
    }

    async fn status(&self, _task_id: &str) -> Result<StatusResponse, ApiError> {
        Self::pop(&self.status_queue, &self.status_calls, "status").await
    }

    async fn results(&self, _task_id: &str) -> Result<ResearchResult, ApiError> {
        Self::pop(&self.results_queue, &self.results_calls, "results").await
    }
}
