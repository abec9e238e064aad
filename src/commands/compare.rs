use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use super::{load_run_config, output_sink};
use crate::diff::diff_models;
use crate::io::output::{create_writer, OutputFormat, Report};
use crate::model::{Side, SnapshotModel};

pub struct CompareConfig {
    pub before: PathBuf,
    pub after: PathBuf,
    pub commit: String,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub no_parallel: bool,
    pub jobs: usize,
}

pub fn compare_snapshots(config: CompareConfig) -> Result<()> {
    let settings = load_run_config(config.config.as_deref(), config.no_parallel, config.jobs)?;
    let before = SnapshotModel::load(Side::Before, &config.before)
        .with_context(|| format!("Failed to load before snapshot {}", config.before.display()))?;
    let after = SnapshotModel::load(Side::After, &config.after)
        .with_context(|| format!("Failed to load after snapshot {}", config.after.display()))?;

    let refactorings = diff_models(&before, &after, &settings);
    info!(commit = %config.commit, count = refactorings.len(), "comparison finished");

    let report = Report::single(config.commit, &refactorings);
    let mut writer = create_writer(config.format, output_sink(config.output.as_deref())?);
    writer.write_report(&report)?;
    Ok(())
}
