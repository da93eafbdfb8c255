//! Data model for the research service wire contract.
//!
//! Field and variant names serialize exactly as the remote service expects
//! (snake_case throughout). Statuses are deliberately open-ended: the service
//! does not publish its full status enumeration, so [`TaskStatus`] wraps the
//! raw string and only distinguishes the one terminal value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of research report to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchType {
    MarketAnalysis,
    CompetitorAnalysis,
    LiteratureReview,
}

impl fmt::Display for ResearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResearchType::MarketAnalysis => write!(f, "market_analysis"),
            ResearchType::CompetitorAnalysis => write!(f, "competitor_analysis"),
            ResearchType::LiteratureReview => write!(f, "literature_review"),
        }
    }
}

impl FromStr for ResearchType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "market_analysis" => Ok(ResearchType::MarketAnalysis),
            "competitor_analysis" => Ok(ResearchType::CompetitorAnalysis),
            "literature_review" => Ok(ResearchType::LiteratureReview),
            other => Err(format!(
                "unknown research type '{other}' (expected market_analysis, competitor_analysis, or literature_review)"
            )),
        }
    }
}

/// How deep the generated report should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Depth {
    Overview,
    Comprehensive,
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Depth::Overview => write!(f, "overview"),
            Depth::Comprehensive => write!(f, "comprehensive"),
        }
    }
}

impl FromStr for Depth {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "overview" => Ok(Depth::Overview),
            "comprehensive" => Ok(Depth::Comprehensive),
            other => Err(format!(
                "unknown depth '{other}' (expected overview or comprehensive)"
            )),
        }
    }
}

/// A research request as submitted to the analyze endpoint.
///
/// Immutable once submitted. No client-side validation is performed beyond
/// the enum typing; the remote service decides acceptance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchRequest {
    pub topic: String,
    pub research_type: ResearchType,
    pub depth: Depth,
    pub include_competitors: bool,
    pub include_trends: bool,
    pub custom_instructions: String,
}

impl ResearchRequest {
    /// Create a request with the service's usual defaults: competitors and
    /// trends included, no custom instructions.
    pub fn new(topic: impl Into<String>, research_type: ResearchType, depth: Depth) -> Self {
        Self {
            topic: topic.into(),
            research_type,
            depth,
            include_competitors: true,
            include_trends: true,
            custom_instructions: String::new(),
        }
    }
}

/// Status string reported by the remote service for a task.
///
/// The service's status vocabulary is open-ended; only `"completed"` is
/// recognized as terminal. Every other value, known or not, means the task
/// is still in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskStatus(String);

impl TaskStatus {
    const COMPLETED: &'static str = "completed";

    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    /// Whether this is the terminal status.
    pub fn is_completed(&self) -> bool {
        self.0 == Self::COMPLETED
    }

    /// Whether the status string is empty (no status observed yet).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaskStatus {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Response from the analyze endpoint: a freshly created task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCreated {
    pub task_id: String,
    pub status: TaskStatus,
}

/// Response from the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: TaskStatus,
}

/// Handle to one remote research task, held by the orchestrator for the
/// lifetime of a single request/poll/fetch cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskHandle {
    /// Opaque identifier minted by the remote service.
    pub task_id: String,
    /// Status reported at creation time.
    pub initial_status: TaskStatus,
    /// When the task was submitted.
    pub submitted_at: DateTime<Utc>,
}

/// A completed research report as returned by the results endpoint.
///
/// `competitors`, `trends`, and `recommendations` may each be absent
/// entirely depending on the request and what the service produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchResult {
    pub summary: String,
    pub findings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trends: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
}
