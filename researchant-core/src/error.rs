//! Error types for the Researchant core library.
//!
//! Uses `thiserror` for public API error types with structured error variants
//! covering the remote API, orchestration, and configuration domains.

use std::path::PathBuf;

/// Top-level error type for the Researchant core library.
#[derive(Debug, thiserror::Error)]
pub enum ResearchantError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] OrchestratorError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the remote research service API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("API request failed: {message}")]
    Request { message: String },

    #[error("HTTP {status} from research service: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("API response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

/// Errors from the task orchestrator, one per lifecycle step.
///
/// Each variant terminates the current request cycle; there is no automatic
/// retry. The orchestrator records a fixed user-visible message for each in
/// its observable state (see [`crate::orchestrator`]), while the structured
/// error is returned to the caller for logging.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("Failed to submit research request: {source}")]
    Submission { source: ApiError },

    #[error("Failed to poll task status: {source}")]
    Poll { source: ApiError },

    #[error("Failed to fetch research results: {source}")]
    Fetch { source: ApiError },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// A type alias for results using the top-level `ResearchantError`.
pub type Result<T> = std::result::Result<T, ResearchantError>;
