//! # partkv
//!
//! An in-memory key-value store shared by worker threads that execute
//! batches of commands from job files:
//! - 26 partitions, each behind its own reader-writer lock
//! - Deadlock-free, globally ordered locking for multi-key commands
//! - A worker pool draining a shared job directory
//! - Bounded background backups of a point-in-time snapshot
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Worker Pool                             │
//! │            (N threads, shared directory cursor)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ one job file per worker
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Command Engine                             │
//! │        WRITE / READ / DELETE / SHOW / WAIT / HELP            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐ BACKUP
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  LockPlan   │          │   Backup    │
//!   │ (ordering)  │          │  Scheduler  │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │ snapshot
//!          ▼                        ▼
//!   ┌──────────────────────────────────────┐
//!   │      Table (26 × RwLock<Partition>)  │
//!   └──────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod protocol;
pub mod engine;
pub mod backup;
pub mod worker;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvsError, Result};
pub use config::Config;
pub use engine::Engine;
pub use backup::BackupScheduler;
pub use worker::WorkerPool;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of partkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
