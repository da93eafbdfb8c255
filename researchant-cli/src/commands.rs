//! Subcommand handlers and the research run loop.

use crate::render;
use crate::{Commands, ConfigAction};
use researchant_core::{
    ClientConfig, HttpResearchApi, PollConfig, ResearchApi, ResearchOrchestrator, ResearchRequest,
    TaskStatus, load_config,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// Dispatch a CLI subcommand.
pub fn handle_command(command: Commands, workspace: &Path) -> anyhow::Result<()> {
    match command {
        Commands::Config { action } => handle_config(action, workspace),
    }
}

fn handle_config(action: ConfigAction, workspace: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(Some(workspace), None)
                .map_err(|e| anyhow::anyhow!("Configuration error: {e}"))?;
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigAction::Init => {
            let config_dir = workspace.join(".researchant");
            std::fs::create_dir_all(&config_dir)?;
            let path = config_dir.join("config.toml");
            if path.exists() {
                println!("Configuration already exists: {}", path.display());
                return Ok(());
            }
            std::fs::write(&path, toml::to_string_pretty(&ClientConfig::default())?)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        ConfigAction::Path => {
            if let Some(dirs) = directories::ProjectDirs::from("dev", "researchant", "researchant")
            {
                let user = dirs.config_dir().join("config.toml");
                println!(
                    "user:      {} {}",
                    user.display(),
                    if user.exists() { "(exists)" } else { "(absent)" }
                );
            }
            let ws = workspace.join(".researchant").join("config.toml");
            println!(
                "workspace: {} {}",
                ws.display(),
                if ws.exists() { "(exists)" } else { "(absent)" }
            );
            Ok(())
        }
    }
}

/// Submit a request against the configured service and watch it to completion.
pub async fn run_research(
    request: ResearchRequest,
    config: &ClientConfig,
    json: bool,
) -> anyhow::Result<()> {
    let api: Arc<dyn ResearchApi> = Arc::new(
        HttpResearchApi::new(&config.api).map_err(|e| anyhow::anyhow!("{e}"))?,
    );
    drive(api, request, &config.poll, json).await
}

/// The watch loop: submit, print status transitions, render the outcome.
///
/// Separated from [`run_research`] so tests can drive it with a mock API.
async fn drive(
    api: Arc<dyn ResearchApi>,
    request: ResearchRequest,
    poll: &PollConfig,
    json: bool,
) -> anyhow::Result<()> {
    let mut orchestrator = ResearchOrchestrator::new(api, poll);
    let mut rx = orchestrator.subscribe();

    println!("Researching: {}", request.topic);
    if let Err(e) = orchestrator.submit(request).await {
        error!(error = %e, "Research submission failed");
        let message = orchestrator
            .view()
            .error
            .unwrap_or_else(|| e.to_string());
        anyhow::bail!(message);
    }
    if let Some(task) = orchestrator.task() {
        info!(task_id = task.task_id.as_str(), "Research task created");
    }

    let mut last_status = TaskStatus::default();
    loop {
        rx.changed().await?;
        let view = rx.borrow_and_update().clone();

        if view.status != last_status && !view.status.is_empty() {
            println!("Status: {}", render::display_status(&view.status));
            last_status = view.status.clone();
        }

        if let Some(message) = view.error {
            orchestrator.teardown();
            anyhow::bail!(message);
        }

        if let Some(report) = view.result {
            orchestrator.teardown();
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render::format_report(&report));
            }
            return Ok(());
        }
    }
}
