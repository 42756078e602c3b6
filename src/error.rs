//! Error types for partkv
//!
//! Provides a unified error type for all operations.
//!
//! Missing keys are not errors: `READ` and `DELETE` report them in-band
//! (`KVSERROR` / `KVSMISSING`). Lock failures cannot occur because
//! `parking_lot` locks neither fail nor poison.

use thiserror::Error;

/// Result type alias using KvsError
pub type Result<T> = std::result::Result<T, KvsError>;

/// Unified error type for partkv operations
#[derive(Debug, Error)]
pub enum KvsError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("KVS state must be initialized")]
    UninitializedStore,

    #[error("KVS state has already been initialized")]
    AlreadyInitialized,

    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    // -------------------------------------------------------------------------
    // Backup Errors
    // -------------------------------------------------------------------------
    #[error("Failed to start backup: {0}")]
    BackupSpawn(String),

    #[error("Backup failed: {0}")]
    Backup(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
