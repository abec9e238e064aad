use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, warn};

use super::{load_run_config, output_sink};
use crate::history::{analyze_commits, load_commit_dir, CommitOutcome};
use crate::io::output::{create_writer, OutputFormat, Report};

pub struct BatchConfig {
    pub dir: PathBuf,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub no_parallel: bool,
    pub jobs: usize,
}

pub fn run_batch(config: BatchConfig) -> Result<()> {
    let settings = load_run_config(config.config.as_deref(), config.no_parallel, config.jobs)?;
    let commits = load_commit_dir(&config.dir)
        .with_context(|| format!("Failed to read commit directory {}", config.dir.display()))?;

    let result = analyze_commits(commits, &settings, |outcome| match outcome {
        CommitOutcome::Analyzed { commit, refactorings } => {
            debug!(commit = %commit, count = refactorings.len(), "commit analyzed");
        }
        CommitOutcome::Failed { commit, error } => {
            warn!(commit = %commit, "commit failed: {error}");
        }
    });

    let mut writer = create_writer(config.format, output_sink(config.output.as_deref())?);
    writer.write_report(&Report::from_outcomes(&result.outcomes))?;
    writer.write_summary(&result.summary)?;
    Ok(())
}
