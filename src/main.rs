use anyhow::Result;
use refdetect::cli::{self, Commands};
use refdetect::commands::{self, BatchConfig, CompareConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// Rayon thread stack size (8MB for deeply nested statement trees)
const RAYON_STACK_SIZE: usize = 8 * 1024 * 1024;

fn main() -> Result<()> {
    let cli = cli::parse_args();
    init_tracing(cli.command.verbosity());
    configure_thread_pool(cli.command.jobs());

    match cli.command {
        Commands::Compare {
            before,
            after,
            commit,
            format,
            output,
            config,
            no_parallel,
            jobs,
            verbosity: _,
        } => commands::compare_snapshots(CompareConfig {
            before,
            after,
            commit,
            format: format.into(),
            output,
            config,
            no_parallel,
            jobs,
        }),
        Commands::Batch {
            dir,
            format,
            output,
            config,
            no_parallel,
            jobs,
            verbosity: _,
        } => commands::run_batch(BatchConfig {
            dir,
            format: format.into(),
            output,
            config,
            no_parallel,
            jobs,
        }),
        Commands::Init { force } => {
            let path = commands::init_config(&std::env::current_dir()?, force)?;
            println!("Created {} configuration file", path.display());
            Ok(())
        }
    }
}

/// `RUST_LOG` wins; otherwise `-v` raises the default `warn` level
fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Configure rayon global thread pool once at startup
fn configure_thread_pool(jobs: usize) {
    let mut builder = rayon::ThreadPoolBuilder::new().stack_size(RAYON_STACK_SIZE);

    if jobs > 0 {
        builder = builder.num_threads(jobs);
    }

    if let Err(e) = builder.build_global() {
        eprintln!("Note: Thread pool already configured: {}", e);
    }
}
