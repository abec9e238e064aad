//! CLI command implementations.
//!
//! - **compare**: detect refactorings between two snapshot files
//! - **batch**: run the comparison over a directory of commits
//! - **init**: write a default `.refdetect.toml`

pub mod batch;
pub mod compare;
pub mod init;

pub use batch::{run_batch, BatchConfig};
pub use compare::{compare_snapshots, CompareConfig};
pub use init::init_config;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::config::{self, RefdetectConfig};

/// Resolve the run configuration and apply command-line overrides
pub(crate) fn load_run_config(path: Option<&Path>, no_parallel: bool, jobs: usize) -> Result<RefdetectConfig> {
    let mut config = match path {
        Some(path) => config::load_config_from(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => config::load_config(),
    };
    if no_parallel {
        config.parallel.enabled = false;
    }
    if jobs > 0 {
        config.parallel.jobs = jobs;
    }
    Ok(config)
}

/// Output destination: the given file or stdout
pub(crate) fn output_sink(output: Option<&Path>) -> Result<Box<dyn Write>> {
    match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}
