//! Command-line front end for the grammar progress ledger and study log.

use std::path::PathBuf;
use std::process;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use services::{AppServices, Clock};
use study_core::model::{ExerciseId, SessionDraft, SessionId, TopicId};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod config;

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "app=info,storage=warn";

#[derive(Parser)]
#[command(name = "study", version, about = "Grammar practice progress and study log")]
struct Cli {
    /// SQLite database URL or path
    #[arg(long, global = true, env = "STUDY_DB_URL", default_value = config::DEFAULT_DB_URL)]
    db: String,

    /// TOML topic catalog (defaults to the built-in French grammar topics)
    #[arg(long, global = true, env = "STUDY_CATALOG")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog topics and mark completed ones
    Topics,

    /// Record the outcome of one exercise
    Answer {
        topic: String,
        exercise: String,
        #[arg(value_enum)]
        outcome: Outcome,
    },

    /// Show per-topic and overall scores
    Progress,

    /// Erase all exercise progress
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Study session log
    Log {
        #[command(subcommand)]
        command: LogCommands,
    },
}

#[derive(Subcommand)]
enum LogCommands {
    /// Log a study session
    Add {
        /// Session date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Topic id
        #[arg(long)]
        topic: String,

        /// Duration in minutes
        #[arg(long, default_value = "60")]
        duration: String,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List sessions, newest first
    List,

    /// Delete a session by id
    Delete {
        id: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Totals and progress toward the practice quota
    Summary,
}

#[derive(Clone, Copy, ValueEnum)]
enum Outcome {
    Correct,
    Incorrect,
}

async fn run(cli: Cli) -> Result<()> {
    let catalog = config::load_catalog(cli.catalog.as_deref())?;
    let db_url = config::normalize_sqlite_url(&cli.db);
    config::prepare_sqlite_file(&db_url)?;
    debug!(%db_url, topics = catalog.len(), "opening store");

    let mut app = AppServices::new_sqlite(&db_url, Clock::default_clock(), catalog).await?;

    match cli.command {
        Commands::Topics => {
            let completed = app.progress().completed_topics();
            for entry in app.catalog().iter() {
                let mark = if completed.contains(entry.id.as_str()) { "✓" } else { " " };
                println!("{mark} {:<20} {}", entry.id, entry.label);
            }
        }
        Commands::Answer {
            topic,
            exercise,
            outcome,
        } => {
            if !app.catalog().contains(&topic) {
                warn!(%topic, "topic is not in the catalog; it will not count toward overall progress");
            }
            let correct = matches!(outcome, Outcome::Correct);
            let progress = app.progress_mut();
            progress
                .record_outcome(TopicId::new(topic.as_str()), ExerciseId::new(exercise), correct)
                .await?;
            let stats = progress.stats_for_topic(&topic);
            println!("{topic}: {}/{}", stats.correct, stats.attempted);
        }
        Commands::Progress => {
            let progress = app.progress();
            for score in progress.topic_scores() {
                println!(
                    "{:<32} {:>3}/{:<3} {:>3}%",
                    score.label, score.correct, score.attempted, score.percentage
                );
            }
            let global = progress.global_stats();
            println!(
                "total: {}/{} ({}%)",
                global.total_correct,
                global.total_attempted,
                global.percentage()
            );
        }
        Commands::Reset { yes } => {
            if !yes {
                bail!("reset erases all progress and cannot be undone; pass --yes to confirm");
            }
            app.progress_mut().reset().await?;
            println!("progress reset");
        }
        Commands::Log { command } => run_log(&mut app, command).await?,
    }

    Ok(())
}

async fn run_log(app: &mut AppServices, command: LogCommands) -> Result<()> {
    match command {
        LogCommands::Add {
            date,
            topic,
            duration,
            notes,
        } => {
            let date = date.unwrap_or_else(|| app.study_log().default_date().to_string());
            let draft = SessionDraft::from_form(&date, &topic, &duration, &notes)?;
            let session = app.study_log_mut().add_session(draft).await?;
            println!(
                "logged {} ({}, {} min) as {}",
                session.topic_name(),
                session.date(),
                session.duration_minutes(),
                session.id()
            );
        }
        LogCommands::List => {
            for session in app.study_log().ordered_sessions() {
                println!(
                    "{}  {}  {:<32} {:>4} min  {}",
                    session.id(),
                    session.date(),
                    session.topic_name(),
                    session.duration_minutes(),
                    session.notes()
                );
            }
        }
        LogCommands::Delete { id, yes } => {
            let id: SessionId = id.parse()?;
            if !yes {
                bail!("pass --yes to delete session {id}");
            }
            let removed = app.study_log_mut().delete_session(id).await?;
            if removed {
                println!("deleted {id}");
            } else {
                println!("no session {id}");
            }
        }
        LogCommands::Summary => {
            let summary = app.study_log().summary();
            println!("sessions: {}", summary.session_count);
            println!("minutes:  {}", summary.total_minutes);
            if summary.requirement_met {
                println!(
                    "quota met ({} sessions of {}+ min)",
                    summary.quota_target(),
                    summary.quota_minutes()
                );
            } else {
                println!(
                    "quota: {}/{} sessions of {}+ min",
                    summary.qualifying_count,
                    summary.quota_target(),
                    summary.quota_minutes()
                );
            }
        }
    }
    Ok(())
}

/// `RUST_LOG` replaces the default filter entirely when set and valid.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_applies_without_rust_log() {
        let filter = log_filter(None).to_string();
        assert!(filter.contains("app=info"));
        assert!(filter.contains("storage=warn"));
        assert_eq!(log_filter(Some("  ")).to_string(), filter);
    }

    #[test]
    fn rust_log_overrides_default_filter() {
        let filter = log_filter(Some("app=debug")).to_string();
        assert!(filter.contains("app=debug"));
        assert!(!filter.contains("app=info"));
    }
}
