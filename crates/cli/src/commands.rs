//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result, WrapErr};
use colored::Colorize;
use pg_client::markup::render_terminal;
use pg_client::{ApiClient, PollOutcome, Poller, TerminalView};
use pg_core::config::{load_config, AppConfig};
use pg_core::engine::PipelineEngine;
use pg_core::stages::StageRegistry;
use pg_core::state::RunRegistry;
use pg_protocol::brief_models::ClientBrief;
use pg_protocol::ipc::Event;
use pg_protocol::run_models::RunStatus;
use pg_server::AppState;
use tokio::sync::mpsc;
use tracing::info;

/// Turn client briefs into multi-section project proposals.
#[derive(Parser)]
#[command(
    name = "proposal",
    version,
    about = "Generate project proposals from client briefs.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Project directory holding `.proposal-kit/`.
    #[arg(long, default_value = ".", global = true)]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Serve the HTTP API and the web client.
    Serve {
        /// Address to bind (overrides config.toml).
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides config.toml).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Submit a brief to a running server and follow its progress.
    Generate {
        /// JSON file with the client brief.
        #[arg(short, long)]
        brief: PathBuf,

        /// Server base URL.
        #[arg(long, default_value = "http://127.0.0.1:8000")]
        server: String,

        /// Write the Markdown proposal here instead of printing it.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a brief through the pipeline in this process.
    Run {
        /// JSON file with the client brief.
        #[arg(short, long)]
        brief: PathBuf,

        /// Write the Markdown proposal here instead of printing it.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List pipeline templates.
    Templates {
        /// Ask this server instead of reading local configuration.
        #[arg(long)]
        server: Option<String>,
    },
}

/// Initialize the tracing subscriber based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match cli.verbose {
        0 => "warn,pg_server=info",
        1 => "info,pg_core=debug,pg_server=debug,pg_client=debug",
        _ => "debug",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve { host, port } => cmd_serve(&cli.root, host, port).await,
        Command::Generate {
            brief,
            server,
            output,
        } => cmd_generate(&cli.root, &brief, &server, output.as_deref()).await,
        Command::Run { brief, output } => cmd_run(&cli.root, &brief, output.as_deref()).await,
        Command::Templates { server } => cmd_templates(&cli.root, server.as_deref()).await,
    }
}

async fn config(root: &Path) -> Result<AppConfig> {
    load_config(root)
        .await
        .wrap_err_with(|| format!("failed to load configuration from {}", root.display()))
}

fn read_brief(path: &Path) -> Result<ClientBrief> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read brief {}", path.display()))?;
    let brief: ClientBrief = serde_json::from_str(&text)
        .wrap_err_with(|| format!("{} is not a valid brief", path.display()))?;
    brief.validate()?;
    Ok(brief)
}

fn emit_proposal(markdown: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, markdown)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            eprintln!("{} {}", "Proposal written to".green(), path.display());
        }
        None => print!("{}", render_terminal(markdown)),
    }
    Ok(())
}

async fn cmd_serve(root: &Path, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = config(root).await?;
    if let Some(host) = host {
        config.global.server.host = host;
    }
    if let Some(port) = port {
        config.global.server.port = port;
    }

    let state = AppState::from_config(&config)?;
    let listener =
        pg_server::bind(&config.global.server.host, config.global.server.port).await?;
    let addr = listener.local_addr()?;
    eprintln!("{} http://{addr}", "Serving proposal generator on".green().bold());

    pg_server::serve(listener, state, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;
    Ok(())
}

async fn cmd_generate(
    root: &Path,
    brief_path: &Path,
    server: &str,
    output: Option<&Path>,
) -> Result<()> {
    let config = config(root).await?;
    let brief = read_brief(brief_path)?;
    let client = ApiClient::new(server)?;

    let run_id = client.submit(&brief).await?;
    info!(%run_id, server, "Submitted brief");
    eprintln!("{} {run_id}", "Run".bold());

    let poller = Poller::new(Arc::new(client.clone()))
        .with_interval(Duration::from_millis(config.global.poller.interval_ms))
        .tracking(run_id);
    let mut view = TerminalView::stderr();

    let outcome = tokio::select! {
        outcome = poller.run(&mut view) => outcome,
        _ = tokio::signal::ctrl_c() => {
            client.cancel(run_id).await?;
            return Err(eyre!("run {run_id} cancelled"));
        }
    };

    match outcome {
        PollOutcome::Succeeded(_) => {
            let data = client.result(run_id).await?;
            emit_proposal(&data.content, output)
        }
        PollOutcome::RunFailed(snapshot) => Err(eyre!(
            "generation failed: {}",
            snapshot.error.unwrap_or_default()
        )),
        PollOutcome::Aborted(err) => Err(err.into()),
    }
}

fn print_event(event: &Event) {
    match event {
        Event::RunStarted {
            template, stages, ..
        } => eprintln!(
            "{} template {} ({} stages)",
            "Starting".bold(),
            template.cyan(),
            stages.len()
        ),
        Event::StageStarted { status, .. } => eprintln!("  {} {status}", "→".blue()),
        Event::StageCompleted {
            stage, progress, ..
        } => eprintln!("  {} {stage} ({progress}%)", "✓".green()),
        Event::RunCompleted { .. } => eprintln!("{}", "Proposal ready".green().bold()),
        Event::RunFailed { error, .. } => eprintln!("{} {error}", "Error:".red().bold()),
    }
}

async fn cmd_run(root: &Path, brief_path: &Path, output: Option<&Path>) -> Result<()> {
    let config = config(root).await?;
    let brief = read_brief(brief_path)?;

    let engine = PipelineEngine::new(StageRegistry::with_builtin(), config.templates)?;
    let (tx, mut rx) = mpsc::channel(64);
    let registry = RunRegistry::new(engine, config.global.retention.max_finished_runs)
        .with_events(tx);

    let run_id = registry.submit(brief).await?;
    let handle = registry
        .handle(run_id)
        .await
        .ok_or_else(|| eyre!("run {run_id} disappeared"))?;

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let done = matches!(event, Event::RunCompleted { .. } | Event::RunFailed { .. });
            print_event(&event);
            if done {
                break;
            }
        }
    });

    let record = handle.wait_terminal().await;
    // The printer ends on the terminal event.
    let _ = printer.await;

    match (record.status, record.result) {
        (RunStatus::Succeeded, Some(proposal)) => emit_proposal(&proposal.to_markdown(), output),
        _ => Err(eyre!(
            "generation failed: {}",
            record.error.unwrap_or_default()
        )),
    }
}

async fn cmd_templates(root: &Path, server: Option<&str>) -> Result<()> {
    let templates = match server {
        Some(server) => ApiClient::new(server)?.templates().await?,
        None => config(root)
            .await?
            .templates
            .into_iter()
            .map(|template| pg_protocol::api_models::TemplateSummary {
                stages: template.stage_names(),
                name: template.name,
                description: template.description,
            })
            .collect(),
    };

    for template in templates {
        println!("{}  {}", template.name.bold(), template.description);
        println!("    {}", template.stages.join(" → ").dimmed());
    }
    Ok(())
}
