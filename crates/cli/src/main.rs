//! FoundersLens CLI
//!
//! Submits a business idea to the analysis service and prints or exports the
//! normalized report. Offers one retry with an alternate API key when the
//! service reports quota exhaustion.

mod render;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use founderslens_core::controller::{
    AnalysisRequest, ControllerEvent, ControllerEventKind, RequestController, RequestState,
};
use founderslens_core::report::Report;
use founderslens_core::transport::HttpTransport;
use founderslens_core::ClientConfig;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "FoundersLens - Business idea analysis")]
struct Args {
    /// Analysis service base URL
    #[arg(long, env = "FOUNDERSLENS_API_URL", global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "FOUNDERSLENS_TIMEOUT_SECS", global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Analyze a business idea
    Analyze {
        /// The business idea
        #[arg(long)]
        idea: String,
        /// Industry the idea belongs to
        #[arg(long)]
        industry: String,
        /// API key sent to the service as `custom_api_key`
        #[arg(long, env = "FOUNDERSLENS_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// Write a Markdown blueprint to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write a Markdown blueprint named after the idea
        #[arg(long, conflicts_with = "output")]
        blueprint: bool,
        /// Print the normalized report as JSON instead of a summary
        #[arg(long)]
        json: bool,
        /// Never prompt for an alternate key
        #[arg(long)]
        no_prompt: bool,
    },
    /// Check that the analysis service is reachable
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("⚠️ Failed to load .env: {}", e);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = args.api_url {
        config.base_url = url;
    }
    if let Some(secs) = args.timeout_secs {
        config.timeout_secs = secs;
    }
    tracing::debug!(
        base_url = %config.base_url,
        timeout_secs = config.timeout_secs,
        "Using analysis service"
    );

    match args.command {
        CliCommand::Health => health(&config).await,
        CliCommand::Analyze {
            idea,
            industry,
            api_key,
            output,
            blueprint,
            json,
            no_prompt,
        } => {
            if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
                config = config.with_api_key(key.trim());
            }
            let interactive = !no_prompt && std::io::stdin().is_terminal();

            let request = AnalysisRequest::new(idea.clone(), industry);
            let report = analyze(&config, request, interactive, spinner()).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render::summary(&report));
            }

            let path = output.or_else(|| {
                blueprint.then(|| PathBuf::from(render::blueprint_filename(&idea)))
            });
            if let Some(path) = path {
                std::fs::write(&path, render::markdown(&idea, &report))
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("✅ Report saved to {}", path.display());
            }
            Ok(())
        }
    }
}

async fn health(config: &ClientConfig) -> Result<()> {
    let transport = HttpTransport::new(config)?;
    let status = transport
        .health()
        .await
        .with_context(|| format!("Analysis service at {} is unreachable", config.base_url))?;
    println!("✅ {} is up: {}", config.base_url, status);
    Ok(())
}

async fn analyze(
    config: &ClientConfig,
    request: AnalysisRequest,
    interactive: bool,
    spinner: ProgressBar,
) -> Result<Report> {
    let (event_tx, event_rx) = mpsc::channel(8);
    let controller = match RequestController::from_config(config) {
        Ok(controller) => controller.with_event_channel(event_tx),
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    let progress = tokio::spawn(follow_events(event_rx, spinner.clone()));

    let outcome = drive(&controller, request, interactive, &spinner).await;

    drop(controller);
    spinner.finish_and_clear();
    let _ = progress.await;

    match outcome? {
        RequestState::Succeeded(report) => Ok(report),
        RequestState::Failed(info) => bail!("{}", info.message),
        other => bail!("Analysis ended in unexpected state: {}", other.name()),
    }
}

/// Submit, then offer one credential retry on quota exhaustion
async fn drive(
    controller: &RequestController,
    request: AnalysisRequest,
    interactive: bool,
    spinner: &ProgressBar,
) -> Result<RequestState> {
    controller.submit(request).await?;

    if let RequestState::Failed(info) = controller.state().await {
        if interactive && info.category.allows_credential_retry() {
            spinner.suspend(|| eprintln!("⚠️ {}", info.message));
            let key = spinner.suspend(prompt_for_key)?;
            if let Some(key) = key {
                controller.retry_with_credential(key).await?;
            }
        }
    }

    Ok(controller.state().await)
}

fn prompt_for_key() -> Result<Option<String>> {
    let key = dialoguer::Password::new()
        .with_prompt("Alternate API key (leave empty to give up)")
        .allow_empty_password(true)
        .interact()?;
    Ok(Some(key).filter(|k| !k.trim().is_empty()))
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Mirror controller transitions onto the spinner
async fn follow_events(mut rx: mpsc::Receiver<ControllerEvent>, pb: ProgressBar) {
    while let Some(event) = rx.recv().await {
        match event.kind {
            ControllerEventKind::Submitted => pb.set_message("Analyzing idea..."),
            ControllerEventKind::RetryRequested => {
                pb.set_message("Retrying with alternate key...")
            }
            ControllerEventKind::Succeeded => pb.set_message("Analysis complete"),
            ControllerEventKind::Failed => pb.set_message("Analysis failed"),
            ControllerEventKind::Dismissed => {}
        }
    }
}
