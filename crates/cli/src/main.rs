//! Planwise CLI - project performance analysis and remediation.

mod bundle;
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use planwise_core::{ProjectId, UserId};
use planwise_performance::{AnalysisOutcome, PerformanceService, ProjectAnalysis};
use planwise_storage::{JsonStorage, Storage};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::bundle::ImportBundle;
use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "planwise")]
#[command(about = "Project performance analysis and recommendations", long_about = None)]
struct Cli {
    /// Storage directory (overrides the config file)
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a project and its tasks from a JSON bundle
    Import {
        /// Bundle file
        bundle: PathBuf,
    },
    /// Analyze a project and record the result
    Analyze {
        /// Project ID
        project: String,
        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply a suggested action (project leaders only)
    Apply {
        /// Project ID
        project: String,
        /// Action code, e.g. prioritize_overdue
        action: String,
        /// Acting user ID
        #[arg(long)]
        user: String,
        /// Suggestion being applied
        #[arg(long)]
        suggestion: Option<String>,
    },
    /// Show analysis history
    History {
        /// Project ID
        project: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => CliConfig::load(path).await?,
        None => CliConfig::default(),
    };
    if let Some(path) = cli.storage {
        config.storage_path = path;
    }

    let storage = JsonStorage::new(&config.storage_path)
        .await
        .with_context(|| format!("opening storage at {}", config.storage_path.display()))?;

    match cli.command {
        Commands::Import { bundle } => {
            let content = tokio::fs::read_to_string(&bundle)
                .await
                .with_context(|| format!("reading {}", bundle.display()))?;
            let bundle: ImportBundle = serde_json::from_str(&content)?;
            let (project, tasks) = bundle.into_models()?;

            let mut storage = storage;
            storage.save_project(&project).await?;
            for task in &tasks {
                storage.save_task(task).await?;
            }
            storage.commit(&format!("import {}", project.id)).await?;

            info!("Imported {} with {} tasks", project.id, tasks.len());
            println!("Imported project: {} - {}", project.id, project.name);
            println!("  Tasks: {}", tasks.len());
            println!("  Members: {}", project.members.len());
        }
        Commands::Analyze { project, json } => {
            let service = PerformanceService::new(storage).with_config(config.engine);
            let outcome = service.analyze(parse_project(&project)?).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                match outcome {
                    AnalysisOutcome::Analyzed(analysis) => print_analysis(&analysis),
                    AnalysisOutcome::NoMetrics { message, .. } => println!("{message}"),
                }
            }
        }
        Commands::Apply { project, action, user, suggestion } => {
            let user: UserId = user.parse().map_err(|_| anyhow::anyhow!("Invalid user ID"))?;
            let service = PerformanceService::new(storage).with_config(config.engine);
            let result = service
                .apply_suggestion(parse_project(&project)?, user, &action, suggestion.as_deref())
                .await?;

            println!("Applied {}: {}", result.outcome.action, result.outcome.summary);
            println!("  Affected tasks: {}", result.outcome.affected);
            println!("{}", serde_json::to_string_pretty(&result.outcome.detail)?);
        }
        Commands::History { project } => {
            let service = PerformanceService::new(storage);
            let records = service.history(parse_project(&project)?).await?;

            println!("History ({})", records.len());
            for record in records {
                println!(
                    "  {} | {} | {}% | {} suggestions",
                    record.timestamp.format("%Y-%m-%d %H:%M"),
                    record.status,
                    record.probability_of_delay,
                    record.suggestions.len(),
                );
                for applied in &record.applied_actions {
                    println!(
                        "      applied {} by {} ({} tasks)",
                        applied.action_code, applied.applied_by, applied.affected
                    );
                }
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_project(id: &str) -> Result<ProjectId> {
    id.parse().map_err(|_| anyhow::anyhow!("Invalid project ID"))
}

fn print_analysis(analysis: &ProjectAnalysis) {
    let m = &analysis.metrics;
    println!("Project {}", analysis.project_id);
    println!("  Status: {} ({})", analysis.status, analysis.color.as_str());
    println!("  {}", analysis.explanation);
    println!("  Delay risk: {}%", analysis.probability_of_delay);
    println!(
        "  Tasks: {}/{} done, {} overdue ({:.2}%)",
        m.completed_tasks, m.total_tasks, m.overdue_tasks, m.completion_rate
    );
    println!(
        "  EV {:.3} | PV {:.3} | SPI {:.3} | TCPI {:.3} | VAC {:.1}",
        m.ev, m.pv, m.spi, m.tcpi, m.vac
    );

    if analysis.suggestions.is_empty() {
        return;
    }
    println!("Suggestions");
    for s in &analysis.suggestions {
        println!("  [{}] {} ({})", s.priority.as_str(), s.title, s.action_code);
        println!("      {}", s.description);
    }
}
