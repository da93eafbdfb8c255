//! # Researchant Core
//!
//! Core library for the Researchant client.
//! Provides the typed API client for the hosted research-report service,
//! layered configuration, error types, and the task orchestrator that owns
//! the submit/poll/fetch lifecycle of one research request.

pub mod api;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod types;

// Re-export commonly used types at the crate root.
pub use api::{HttpResearchApi, MockResearchApi, ResearchApi};
pub use config::{ApiConfig, ClientConfig, PollConfig, config_exists, load_config};
pub use error::{ApiError, ConfigError, OrchestratorError, ResearchantError, Result};
pub use orchestrator::{ResearchOrchestrator, ResearchView};
pub use types::{
    Depth, ResearchRequest, ResearchResult, ResearchType, StatusResponse, TaskCreated, TaskHandle,
    TaskStatus,
};
