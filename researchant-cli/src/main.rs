//! Researchant CLI — terminal front end for the research service.
//!
//! Submits a research request, watches task status while the remote service
//! works, and renders the finished report.

mod commands;
mod render;

use clap::Parser;
use researchant_core::{Depth, ResearchRequest, ResearchType};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Researchant: decision-ready research reports from the command line
#[derive(Parser, Debug)]
#[command(name = "researchant", version, about, long_about = None)]
struct Cli {
    /// Research topic (e.g., "Marie Gold Biscuit market analysis")
    topic: Option<String>,

    /// Kind of report: market_analysis, competitor_analysis, literature_review
    #[arg(short = 't', long, default_value_t = ResearchType::MarketAnalysis)]
    research_type: ResearchType,

    /// Report depth: overview or comprehensive
    #[arg(short, long, default_value_t = Depth::Comprehensive)]
    depth: Depth,

    /// Exclude competitor analysis from the report
    #[arg(long)]
    no_competitors: bool,

    /// Exclude trend analysis from the report
    #[arg(long)]
    no_trends: bool,

    /// Extra instructions passed to the research service
    #[arg(short, long, default_value = "")]
    instructions: String,

    /// Print the finished report as JSON instead of formatted text
    #[arg(long)]
    json: bool,

    /// Base URL override for the research service
    #[arg(long)]
    base_url: Option<String>,

    /// Workspace directory
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default workspace config file
    Init,
    /// Print the configuration file locations
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "researchant", "researchant")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "researchant.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    // Resolve workspace
    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    // Handle subcommands
    if let Some(command) = cli.command {
        return commands::handle_command(command, &workspace);
    }

    let Some(topic) = cli.topic else {
        anyhow::bail!(
            "No topic given. Pass a research topic, e.g.: researchant \"Marie Gold Biscuit market analysis\""
        );
    };

    // Load configuration
    let mut config = researchant_core::load_config(Some(&workspace), None)
        .map_err(|e| anyhow::anyhow!("Configuration error: {e}"))?;

    // Apply CLI overrides
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }

    let mut request = ResearchRequest::new(topic, cli.research_type, cli.depth);
    request.include_competitors = !cli.no_competitors;
    request.include_trends = !cli.no_trends;
    request.custom_instructions = cli.instructions;

    commands::run_research(request, &config, cli.json).await
}
