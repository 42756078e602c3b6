//! Worker Module
//!
//! Batch processing of job files.
//!
//! ## Architecture
//! - One shared, mutex-guarded directory cursor
//! - N worker threads, each claiming whole job files
//! - Commands within a job run strictly in file order
//! - No ordering between jobs
//!
//! A failing job is logged and abandoned; its worker moves on to the next
//! file.

mod cursor;
mod job;
mod pool;

pub use cursor::JobCursor;
pub use job::{backup_path, output_path, JobContext, JobReport, JobRunner};
pub use pool::{RunSummary, WorkerPool};
