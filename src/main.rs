use anyhow::Context;
use chrono::{DateTime, FixedOffset, Local};
use clap::{Parser, Subcommand, ValueEnum};
use periodic_notes::models::{ActivityKind, AgentTask, CodeHostActivity, IssueTouched, ProgressUpdate, UpdateScope};
use periodic_notes::{init_tracing, EngineConfig, NoteEngine, VaultStore};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Mirror one event into the daily action and weekly cycle notes",
    long_about = None
)]
struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true, env = "PERIODIC_NOTES_CONFIG")]
    config: Option<PathBuf>,

    /// When the event happened (RFC 3339). Defaults to now.
    #[arg(long, global = true, value_parser = parse_timestamp)]
    at: Option<DateTime<FixedOffset>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log a completed task.
    CompleteTask { text: String },
    /// Remove a previously logged completed task.
    UncompleteTask { text: String },
    /// Insert or refresh an initiative or project update.
    Progress {
        #[arg(long, value_enum)]
        scope: ScopeArg,
        #[arg(long)]
        url: String,
        #[arg(long)]
        label: String,
        #[arg(long, default_value = "")]
        body: String,
    },
    /// Record an issue that was created or changed.
    Issue {
        #[arg(long)]
        identifier: String,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        title: String,
        #[arg(long)]
        status: String,
        #[arg(long)]
        url: String,
        /// Replace an existing line for this issue.
        #[arg(long)]
        status_changed: bool,
    },
    /// Record an AI agent task.
    AgentTask {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        url: String,
    },
    /// Log a pull request or commit in the daily note.
    CodeHost {
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long)]
        repo: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        number: Option<u64>,
        #[arg(long)]
        sha: Option<String>,
        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ScopeArg {
    Initiative,
    Project,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Pr,
    Commit,
    Other,
}

fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(raw).map_err(|error| format!("invalid RFC 3339 timestamp '{}': {}", raw, error))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = EngineConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    init_tracing(config.log_dir.as_deref()).context("failed to initialise logging")?;

    let vault = VaultStore::new(config.vault_root()?);
    let engine = NoteEngine::new(vault, config)?;
    let at = cli.at.unwrap_or_else(|| Local::now().fixed_offset());

    let output = match cli.command {
        Commands::CompleteTask { text } => serde_json::to_value(engine.append_completed_task(&text, at))?,
        Commands::UncompleteTask { text } => match engine.remove_completed_task(&text, at) {
            Ok(removed) => json!({ "removed": removed }),
            Err(error) => {
                tracing::warn!(error = %error, "failed to remove completed task");
                json!({ "removed": false, "error": error.to_string() })
            }
        },
        Commands::Progress { scope, url, label, body } => {
            let update = ProgressUpdate {
                scope: match scope {
                    ScopeArg::Initiative => UpdateScope::Initiative,
                    ScopeArg::Project => UpdateScope::Project,
                },
                url,
                label,
                body,
            };
            serde_json::to_value(engine.upsert_progress_update(&update, at))?
        }
        Commands::Issue {
            identifier,
            project,
            title,
            status,
            url,
            status_changed,
        } => {
            let issue = IssueTouched {
                identifier,
                project,
                title,
                status,
                url,
                status_changed,
            };
            serde_json::to_value(engine.upsert_issue_touched(&issue, at))?
        }
        Commands::AgentTask { id, title, url } => {
            serde_json::to_value(engine.record_agent_task(&AgentTask { id, title, url }, at))?
        }
        Commands::CodeHost {
            kind,
            repo,
            title,
            number,
            sha,
            url,
        } => {
            let activity = CodeHostActivity {
                kind: match kind {
                    KindArg::Pr => ActivityKind::PullRequest,
                    KindArg::Commit => ActivityKind::Commit,
                    KindArg::Other => ActivityKind::Other,
                },
                repo,
                title,
                number,
                sha,
                url,
            };
            serde_json::to_value(engine.record_code_host_activity(&activity, at))?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
