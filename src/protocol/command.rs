//! Command definitions
//!
//! Represents commands read from job files.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Write,
    Read,
    Delete,
    Show,
    Wait,
    Backup,
    Help,
    Invalid,
    Empty,
    EndOfFile,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Insert or overwrite key/value pairs
    Write { pairs: Vec<(String, String)> },

    /// Read values for keys
    Read { keys: Vec<String> },

    /// Delete keys
    Delete { keys: Vec<String> },

    /// Dump the whole table to the job output
    Show,

    /// Pause the worker
    Wait { delay_ms: u64 },

    /// Snapshot the table to a backup file
    Backup,

    /// Print usage
    Help,

    /// A line that could not be parsed
    Invalid { reason: String },

    /// Blank line or comment
    Empty,

    /// No more commands in this job
    EndOfFile,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Write { .. } => CommandType::Write,
            Command::Read { .. } => CommandType::Read,
            Command::Delete { .. } => CommandType::Delete,
            Command::Show => CommandType::Show,
            Command::Wait { .. } => CommandType::Wait,
            Command::Backup => CommandType::Backup,
            Command::Help => CommandType::Help,
            Command::Invalid { .. } => CommandType::Invalid,
            Command::Empty => CommandType::Empty,
            Command::EndOfFile => CommandType::EndOfFile,
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Command::Invalid {
            reason: reason.into(),
        }
    }
}
