use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "refdetect")]
#[command(about = "Detect refactorings between two snapshots of a codebase", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare a before and an after snapshot
    Compare {
        /// Snapshot of the codebase before the change (JSON)
        before: PathBuf,

        /// Snapshot of the codebase after the change (JSON)
        after: PathBuf,

        /// Commit id reported in the output
        #[arg(long, default_value = "working-copy")]
        commit: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (defaults to the nearest .refdetect.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Disable parallel body mapping
        #[arg(long = "no-parallel")]
        no_parallel: bool,

        /// Number of worker threads (0 = all cores)
        #[arg(short = 'j', long = "jobs", default_value = "0", env = "REFDETECT_JOBS")]
        jobs: usize,

        /// Increase verbosity level (-v: info, -vv: debug)
        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,
    },

    /// Compare every commit directory below DIR
    ///
    /// Each commit lives in its own directory holding before.json and after.json.
    Batch {
        /// Directory of commit directories
        dir: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (defaults to the nearest .refdetect.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Disable parallel processing of commits
        #[arg(long = "no-parallel")]
        no_parallel: bool,

        /// Number of worker threads (0 = all cores)
        #[arg(short = 'j', long = "jobs", default_value = "0", env = "REFDETECT_JOBS")]
        jobs: usize,

        /// Increase verbosity level (-v: info, -vv: debug)
        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,
    },

    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Commands {
    pub fn verbosity(&self) -> u8 {
        match self {
            Commands::Compare { verbosity, .. } | Commands::Batch { verbosity, .. } => *verbosity,
            Commands::Init { .. } => 0,
        }
    }

    pub fn jobs(&self) -> usize {
        match self {
            Commands::Compare { jobs, .. } | Commands::Batch { jobs, .. } => *jobs,
            Commands::Init { .. } => 0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    Json,
    Terminal,
}

impl From<OutputFormat> for crate::io::output::OutputFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Json => crate::io::output::OutputFormat::Json,
            OutputFormat::Terminal => crate::io::output::OutputFormat::Terminal,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
