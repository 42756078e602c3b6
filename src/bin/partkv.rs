//! partkv Binary
//!
//! Processes every job file in a directory.

use clap::Parser;
use partkv::{Config, Engine, WorkerPool};
use tracing_subscriber::{fmt, EnvFilter};

/// partkv job runner
#[derive(Parser, Debug)]
#[command(name = "partkv")]
#[command(about = "Partitioned in-memory key-value store driven by job files")]
#[command(version)]
struct Args {
    /// Directory containing .job files
    jobs_dir: String,

    /// Maximum concurrent backups
    max_backups: usize,

    /// Number of worker threads
    max_threads: usize,

    /// Maximum pairs per WRITE/READ/DELETE
    #[arg(long, default_value = "10")]
    max_write_size: usize,

    /// Maximum key/value buffer size (tokens hold one byte less)
    #[arg(long, default_value = "40")]
    max_string_size: usize,
}

fn main() {
    // Diagnostics go to stderr; stdout is reserved for HELP
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,partkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("partkv v{}", partkv::VERSION);
    tracing::info!("Jobs directory: {}", args.jobs_dir);

    let config = Config::builder()
        .jobs_dir(&args.jobs_dir)
        .max_backups(args.max_backups)
        .max_threads(args.max_threads)
        .max_write_size(args.max_write_size)
        .max_string_size(args.max_string_size)
        .build();

    let engine = Engine::uninitialized();
    if let Err(e) = engine.init() {
        tracing::error!("Failed to initialize KVS: {}", e);
        std::process::exit(1);
    }

    let pool = match WorkerPool::with_engine(config, engine) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let summary = match pool.run() {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Failed to open directory {}: {}", args.jobs_dir, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = pool.engine().terminate() {
        tracing::warn!("{}", e);
    }

    tracing::info!(
        jobs = summary.jobs_processed,
        failed = summary.jobs_failed,
        backups = summary.backups_started,
        backups_failed = summary.backups_failed,
        "done"
    );
}
