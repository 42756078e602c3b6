//! Backup Module
//!
//! Point-in-time snapshots written while the table keeps serving.
//!
//! ## Flow
//! ```text
//!  worker ──BACKUP──► admission ──► clone table ──► spawn task ──► next command
//!                     (blocks at     (table lock     │
//!                      the cap)       held briefly)  ▼
//!                                              write name-N.bck
//!                                                    │
//!                               reaped on admission ◄┘ or at shutdown
//! ```
//!
//! The clone is the isolation point: once it exists the backup task needs
//! no locks and never touches the live table.

mod scheduler;
mod task;

pub use scheduler::BackupScheduler;
pub use task::write_backup;
